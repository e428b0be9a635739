// crates/forge-core/src/uri.rs
// ============================================================================
// Module: Engine URI
// Description: Parsed addressing scheme for engine references.
// Purpose: Represent `go://`, `alias://`, and `shell://` engine references as
//          a typed value instead of a raw string, so every downstream crate
//          matches on the same three variants.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`EngineUri`] is the declarative reference a manifest uses to name an
//! engine (`BuildSpec::engine`, `TestSpec::runner`, a `SubEngineSpec::engine`,
//! ...). Parsing happens once, here; every other crate works with the typed
//! value. Resolution of an `EngineUri` into a runnable `(command, argv)` is
//! the Engine Resolver's job (`forge-resolver`), not this crate's.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as DeError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while parsing an engine URI.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineUriError {
    /// The URI has no `scheme://` prefix at all.
    #[error("engine uri missing scheme: {0}")]
    MissingScheme(String),
    /// The URI's scheme is not one of `go`, `alias`, `shell`.
    #[error("unknown engine uri scheme: {0}")]
    UnknownScheme(String),
    /// The URI has a recognized scheme but an empty body.
    #[error("engine uri has empty body: {0}")]
    EmptyBody(String),
}

// ============================================================================
// SECTION: Engine URI
// ============================================================================

/// A declarative reference to an engine.
///
/// # Invariants
/// - `Go` and `Alias` bodies are non-empty identifiers (no whitespace
///   validation beyond non-emptiness is performed here).
/// - `Shell` bodies are the literal command line, taken verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineUri {
    /// `go://<name>` — a well-known built-in worker name.
    Go(String),
    /// `alias://<alias>` — a manifest-defined composition of sub-engines.
    Alias(String),
    /// `shell://<command...>` — a literal command line.
    Shell(String),
}

impl EngineUri {
    /// Returns the scheme name (`"go"`, `"alias"`, or `"shell"`).
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Go(_) => "go",
            Self::Alias(_) => "alias",
            Self::Shell(_) => "shell",
        }
    }

    /// Returns the body following `scheme://`.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Go(body) | Self::Alias(body) | Self::Shell(body) => body,
        }
    }

    /// Returns the alias name when this is an `alias://` reference.
    #[must_use]
    pub fn as_alias(&self) -> Option<&str> {
        match self {
            Self::Alias(name) => Some(name.as_str()),
            Self::Go(_) | Self::Shell(_) => None,
        }
    }
}

impl fmt::Display for EngineUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme(), self.body())
    }
}

impl FromStr for EngineUri {
    type Err = EngineUriError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((scheme, body)) = value.split_once("://") else {
            return Err(EngineUriError::MissingScheme(value.to_string()));
        };
        if body.is_empty() {
            return Err(EngineUriError::EmptyBody(value.to_string()));
        }
        match scheme {
            "go" => Ok(Self::Go(body.to_string())),
            "alias" => Ok(Self::Alias(body.to_string())),
            "shell" => Ok(Self::Shell(body.to_string())),
            other => Err(EngineUriError::UnknownScheme(other.to_string())),
        }
    }
}

impl Serialize for EngineUri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EngineUri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_schemes() {
        assert_eq!("go://gobuild".parse(), Ok(EngineUri::Go("gobuild".to_string())));
        assert_eq!("alias://fmt".parse(), Ok(EngineUri::Alias("fmt".to_string())));
        assert_eq!(
            "shell://echo hi".parse(),
            Ok(EngineUri::Shell("echo hi".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert_eq!(
            "ftp://thing".parse::<EngineUri>(),
            Err(EngineUriError::UnknownScheme("ftp".to_string()))
        );
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(matches!(
            "not-a-uri".parse::<EngineUri>(),
            Err(EngineUriError::MissingScheme(_))
        ));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(matches!("go://".parse::<EngineUri>(), Err(EngineUriError::EmptyBody(_))));
    }

    #[test]
    fn display_round_trips_through_parse() {
        let uri = EngineUri::Alias("lint".to_string());
        let rendered = uri.to_string();
        assert_eq!(rendered.parse::<EngineUri>(), Ok(uri));
    }
}
