// crates/forge-protocol/src/client.rs
// ============================================================================
// Module: Tool Client
// Description: Drives a child engine through the tool-invocation protocol.
// Purpose: Implement §4.3's contract: spawn, frame requests/responses,
//          forward stderr, enforce timeouts, and escalate cancellation
//          from SIGTERM to SIGKILL.
// Dependencies: tokio, forge-core, forge-protocol::{wire, framing, error}
// ============================================================================

//! ## Overview
//! [`ToolClient`] owns one child engine process for the lifetime of a single
//! logical call. It writes one framed `tools/call` request to the child's
//! stdin, reads framed responses from its stdout (pairing by request `id`),
//! and drains the child's stderr on a dedicated task, forwarding each line
//! to a [`Logger`] prefixed with the engine's label (§4.3.1). Cancellation
//! closes stdin and, if the child does not exit within a grace window,
//! escalates from `SIGTERM` to `SIGKILL` (§5).

use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use forge_core::CancellationToken;
use forge_core::Logger;
use forge_core::prefixed;
use serde_json::Value;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time;

use crate::error::ToolClientError;
use crate::framing::read_frame;
use crate::framing::write_frame;
use crate::wire::ToolCallRequest;
use crate::wire::ToolCallResponse;
use crate::wire::ToolCallResult;

/// Default grace window before escalating from `SIGTERM` to `SIGKILL`
/// (§5: "default 5s").
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Environment variable carrying the per-call timeout duration in seconds
/// (§4.4, §6: `FORGE_TOOL_TIMEOUT`).
pub const TOOL_TIMEOUT_ENV: &str = "FORGE_TOOL_TIMEOUT";

/// Drives one child engine through the tool-invocation protocol.
///
/// # Invariants
/// - Exactly one request is outstanding at a time; [`ToolClient::call`]
///   writes a request and does not return until its matching response is
///   read, an error occurs, or the call is cancelled/times out (§4.3: "One
///   tool call per request ID").
pub struct ToolClient {
    /// Label used in error messages and stderr-forwarding prefixes, e.g.
    /// the engine's URI or resolved command.
    engine: String,
    /// The spawned child process.
    child: Child,
    /// The child's stdin, framed one JSON value per line. `None` once
    /// closed (cancellation, or after `terminate`).
    stdin: Option<ChildStdin>,
    /// The child's stdout, buffered for line-framed reads.
    stdout: BufReader<tokio::process::ChildStdout>,
    /// Background task forwarding the child's stderr lines to the logger.
    stderr_task: Option<JoinHandle<()>>,
    /// Next request id to use; strictly increasing per client.
    next_id: u64,
}

impl ToolClient {
    /// Spawns `command` with `args`, `env`, and `work_dir`, wiring stdin and
    /// stdout for line-delimited JSON-RPC and forwarding stderr to `logger`
    /// prefixed with `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolClientError::Spawn`] if the process cannot be started.
    pub fn spawn(
        engine: impl Into<String>,
        command: &str,
        args: &[String],
        env: &BTreeMap<String, String>,
        work_dir: Option<&str>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, ToolClientError> {
        let engine = engine.into();
        let mut builder = Command::new(command);
        builder.args(args).envs(env).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = work_dir {
            builder.current_dir(dir);
        }
        let mut child = builder
            .spawn()
            .map_err(|source| ToolClientError::Spawn { engine: engine.clone(), source })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolClientError::ProtocolAborted { engine: engine.clone(), id: 0 })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolClientError::ProtocolAborted { engine: engine.clone(), id: 0 })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolClientError::ProtocolAborted { engine: engine.clone(), id: 0 })?;

        let stderr_logger = prefixed(logger, engine.clone());
        let stderr_task = tokio::spawn(forward_stderr(stderr, stderr_logger));

        Ok(Self {
            engine,
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            stderr_task: Some(stderr_task),
            next_id: 1,
        })
    }

    /// Sends one `tools/call` request for `tool` with `arguments` and
    /// returns its result, racing against `timeout` (when set) and
    /// `cancellation`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolClientError::ToolReportedError`] when the engine's
    /// response carries `isError: true`; [`ToolClientError::ProtocolAborted`]
    /// or [`ToolClientError::ProtocolMalformed`] on protocol violations;
    /// [`ToolClientError::Cancelled`] or [`ToolClientError::TimedOut`] when
    /// the call is aborted before a response arrives.
    pub async fn call(
        &mut self,
        tool: &str,
        arguments: Value,
        timeout: Option<Duration>,
        cancellation: &CancellationToken,
    ) -> Result<ToolCallResult, ToolClientError> {
        let id = self.next_id;
        self.next_id += 1;
        let request = ToolCallRequest::new(id, tool, arguments);
        let payload = serde_json::to_vec(&request)
            .map_err(|source| ToolClientError::Serialize { engine: self.engine.clone(), source })?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ToolClientError::ProtocolAborted { engine: self.engine.clone(), id })?;
        write_frame(stdin, &payload)
            .await
            .map_err(|source| ToolClientError::Io { engine: self.engine.clone(), source })?;

        let response = tokio::select! {
            biased;
            () = cancellation.cancelled() => {
                self.terminate(DEFAULT_GRACE_PERIOD).await;
                return Err(ToolClientError::Cancelled { engine: self.engine.clone() });
            }
            response = Self::await_with_timeout(timeout, self.read_response(id)) => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(ToolClientError::TimedOut { timeout, .. }) => {
                self.terminate(DEFAULT_GRACE_PERIOD).await;
                return Err(ToolClientError::TimedOut { engine: self.engine.clone(), timeout });
            }
            Err(other) => return Err(other),
        };

        if let Some(error) = response.error {
            return Err(ToolClientError::ToolReportedError {
                engine: self.engine.clone(),
                tool: tool.to_string(),
                message: error.message,
            });
        }
        let Some(result) = response.result else {
            return Err(ToolClientError::ProtocolMalformed {
                engine: self.engine.clone(),
                line_prefix: "response carried neither result nor error".to_string(),
            });
        };
        if result.is_error {
            return Err(ToolClientError::ToolReportedError {
                engine: self.engine.clone(),
                tool: tool.to_string(),
                message: result.text(),
            });
        }
        Ok(result)
    }

    /// Awaits `fut`, racing it against `duration` when set.
    async fn await_with_timeout<F, T>(duration: Option<Duration>, fut: F) -> Result<T, ToolClientError>
    where
        F: std::future::Future<Output = Result<T, ToolClientError>>,
    {
        let Some(duration) = duration else {
            return fut.await;
        };
        match time::timeout(duration, fut).await {
            Ok(result) => result,
            Err(_elapsed) => {
                Err(ToolClientError::TimedOut { engine: String::new(), timeout: duration })
            }
        }
    }

    /// Reads frames from stdout until one parses as a response matching
    /// `expected_id`.
    async fn read_response(&mut self, expected_id: u64) -> Result<ToolCallResponse, ToolClientError> {
        loop {
            let frame = read_frame(&mut self.stdout)
                .await
                .map_err(|source| ToolClientError::Io { engine: self.engine.clone(), source })?;
            let Some(line) = frame else {
                return Err(ToolClientError::ProtocolAborted {
                    engine: self.engine.clone(),
                    id: expected_id,
                });
            };
            if line.is_empty() {
                continue;
            }
            let response: ToolCallResponse = serde_json::from_slice(&line).map_err(|_err| {
                ToolClientError::ProtocolMalformed {
                    engine: self.engine.clone(),
                    line_prefix: String::from_utf8_lossy(&line[..line.len().min(120)]).into_owned(),
                }
            })?;
            if response.id != expected_id {
                continue;
            }
            return Ok(response);
        }
    }

    /// Closes stdin and waits for the child to exit within `grace`; escalates
    /// `SIGTERM` then `SIGKILL` if it does not (§5).
    async fn terminate(&mut self, grace: Duration) {
        self.stdin = None;
        if time::timeout(grace, self.child.wait()).await.is_ok() {
            return;
        }
        send_sigterm(&self.child);
        if time::timeout(grace, self.child.wait()).await.is_ok() {
            return;
        }
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

/// Sends `SIGTERM` to the child on unix; a no-op elsewhere (non-unix has no
/// graceful-termination signal distinct from `SIGKILL`/`TerminateProcess`,
/// so [`ToolClient::terminate`] falls through to `start_kill` there).
#[cfg(unix)]
fn send_sigterm(child: &Child) {
    let Some(pid) = child.id() else { return };
    let Ok(pid) = i32::try_from(pid) else { return };
    #[allow(
        unsafe_code,
        reason = "sending a signal to our own child process requires an FFI call; no safe std API exists"
    )]
    unsafe {
        libc::kill(pid, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) {}

/// Drains `stderr` line by line, forwarding each to `logger` until EOF.
async fn forward_stderr(stderr: tokio::process::ChildStderr, logger: Arc<dyn Logger>) {
    let mut reader = BufReader::new(stderr);
    loop {
        match read_frame(&mut reader).await {
            Ok(Some(line)) => logger.info(&String::from_utf8_lossy(&line)),
            Ok(None) | Err(_) => break,
        }
    }
}

impl Drop for ToolClient {
    fn drop(&mut self) {
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
        let _ = self.child.start_kill();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]

    use forge_core::NullLogger;

    use super::*;

    /// A tiny shell worker that reads one request line (discarded) and
    /// replies with a fixed, well-formed response for request id 1.
    fn canned_response_client(response_json: &str) -> ToolClient {
        let script = format!("read -r _line; printf '%s\\n' '{response_json}'");
        ToolClient::spawn(
            "shell://canned",
            "sh",
            &["-c".to_string(), script],
            &BTreeMap::new(),
            None,
            Arc::new(NullLogger),
        )
        .expect("spawn sh")
    }

    #[tokio::test]
    async fn call_parses_structured_result() {
        let mut client = canned_response_client(
            r#"{"id":1,"result":{"content":[{"type":"text","text":"ok"}],"structured":{"name":"app"}}}"#,
        );
        let result = client
            .call("build", serde_json::json!({"name": "app"}), None, &CancellationToken::new())
            .await
            .expect("call");
        assert_eq!(result.structured.expect("structured")["name"], "app");
    }

    #[tokio::test]
    async fn call_surfaces_tool_reported_error() {
        let mut client = canned_response_client(r#"{"id":1,"error":{"code":-1,"message":"boom"}}"#);
        let error = client
            .call("build", serde_json::json!({}), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ToolClientError::ToolReportedError { message, .. } if message == "boom"));
    }

    #[tokio::test]
    async fn call_detects_protocol_aborted_on_early_exit() {
        let mut client = ToolClient::spawn(
            "shell://true",
            "true",
            &[],
            &BTreeMap::new(),
            None,
            Arc::new(NullLogger),
        )
        .expect("spawn true");
        let error = client
            .call("build", serde_json::json!({}), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ToolClientError::ProtocolAborted { .. }));
    }

    #[test]
    fn default_grace_period_is_five_seconds() {
        assert_eq!(DEFAULT_GRACE_PERIOD, Duration::from_secs(5));
    }
}
