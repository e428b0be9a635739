// crates/forge-protocol/src/framing.rs
// ============================================================================
// Module: Line Framing
// Description: Line-delimited message framing over an async byte stream.
// Purpose: Implement §4.3/§6's wire format: "exactly one complete JSON value
//          per `\n`-terminated line, both directions" — deliberately not
//          `Content-Length:` header framing.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! A frame is one JSON value serialized without embedded newlines, followed
//! by `\n`. [`write_frame`] writes one; [`read_frame`] reads one, returning
//! `Ok(None)` on clean EOF (the child closed stdout, §4.3's
//! `ProtocolAborted` condition) and the raw line bytes otherwise so the
//! caller can attempt to parse JSON and classify a parse failure as
//! `ProtocolMalformed` with context the framing layer itself does not have.

use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

/// Writes one `\n`-terminated frame containing `payload`.
///
/// # Errors
///
/// Returns the underlying I/O error on write or flush failure.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Reads one `\n`-terminated frame, with the trailing newline stripped.
///
/// Returns `Ok(None)` when the stream is at EOF before any bytes of a new
/// frame are read (a closed child stdout). A frame of zero length (a blank
/// line) is returned as `Ok(Some(Vec::new()))`; callers treat an empty frame
/// the same as any other line that fails to parse as JSON.
///
/// # Errors
///
/// Returns the underlying I/O error on read failure.
pub async fn read_frame<R>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let bytes_read = reader.read_until(b'\n', &mut line).await?;
    if bytes_read == 0 {
        return Ok(None);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
