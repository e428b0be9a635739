// crates/forge-core/src/logging.rs
// ============================================================================
// Module: Logging
// Description: A minimal leveled logger trait for kernel diagnostics.
// Purpose: Keep every crate's diagnostic output off stdout (reserved for the
//          tool-invocation protocol and CLI results) per §2.1/§9.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The kernel never reaches for a global logging framework. Instead, a
//! [`Logger`] trait object is threaded explicitly through orchestrators and
//! the Tool Client, the way the teacher threads its audit/metrics sinks.
//! [`StderrLogger`] is the production implementation; [`NullLogger`] is used
//! in tests that don't care about diagnostic output.

use std::sync::Arc;

// ============================================================================
// SECTION: Level
// ============================================================================

/// Severity of a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Fine-grained diagnostic detail, off by default.
    Debug,
    /// Routine progress ("starting builder gofmt", "artifact produced").
    Info,
    /// Recoverable anomalies (partial delete, retried sub-engine).
    Warn,
    /// Failures that abort a pipeline.
    Error,
}

impl LogLevel {
    /// Renders a short, fixed-width label for line prefixes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

// ============================================================================
// SECTION: Logger
// ============================================================================

/// A sink for kernel diagnostic and progress lines.
///
/// # Invariants
/// - Implementations MUST NOT write to stdout; stdout is reserved for the
///   tool-invocation protocol and top-level CLI results (§2.1).
pub trait Logger: Send + Sync {
    /// Emits one log line at the given level.
    fn log(&self, level: LogLevel, message: &str);

    /// Emits a [`LogLevel::Debug`] line.
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Emits a [`LogLevel::Info`] line.
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Emits a [`LogLevel::Warn`] line.
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Emits a [`LogLevel::Error`] line.
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Writes log lines to stderr, filtering below a configured minimum level.
///
/// # Invariants
/// - This is the one place in the kernel permitted to write diagnostics to
///   stderr directly; every other crate goes through a `&dyn Logger`.
#[derive(Debug, Clone, Copy)]
pub struct StderrLogger {
    /// Lines below this level are discarded.
    min_level: LogLevel,
}

impl StderrLogger {
    /// Builds a logger that emits `min_level` and above.
    #[must_use]
    pub const fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        #[allow(clippy::print_stderr, reason = "sanctioned diagnostic sink, never stdout")]
        {
            eprintln!("[{}] {message}", level.label());
        }
    }
}

/// Discards every log line. Used by tests that don't assert on logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Returns a [`Logger`] that prefixes every line with `prefix` before
/// forwarding to `inner`. Used to tag stderr lines forwarded from a specific
/// engine (§4.3.1).
#[must_use]
pub fn prefixed(inner: Arc<dyn Logger>, prefix: String) -> Arc<dyn Logger> {
    Arc::new(PrefixedLogger { inner, prefix })
}

/// A [`Logger`] wrapper that prepends a fixed prefix to every message.
struct PrefixedLogger {
    /// The wrapped logger.
    inner: Arc<dyn Logger>,
    /// Prefix inserted before the message, e.g. an engine URI.
    prefix: String,
}

impl Logger for PrefixedLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.inner.log(level, &format!("{}: {message}", self.prefix));
    }
}
