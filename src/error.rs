//! Error types shared across the client.
//!
//! Transport failures keep the underlying `io::Error` reachable through
//! `source()`, so callers can still inspect OS-level detail. Parse failures
//! form their own closed domain on top of that, and cancellation is its own
//! kind so callbacks can tell it apart from real failures.

use std::io;

use thiserror::Error;

/// Application-level parse failures.
///
/// Produced only while interpreting the status line; malformed header lines
/// are skipped during parsing rather than reported.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidResponse {
    /// The status line did not start with the literal `HTTP/1.1`.
    #[error("unexpected HTTP version in status line")]
    UnsupportedVersion,
    /// The status code token was not an unsigned integer.
    #[error("malformed status code in status line")]
    MalformedStatusCode,
}

/// Everything that can go wrong between `execute()` and the completion
/// callback.
///
/// Transport variants name the step that failed and wrap the originating
/// `io::Error`; `Cancelled` and `InvalidResponse` are produced by the client
/// itself.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to resolve host: {0}")]
    Resolve(#[source] io::Error),
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to send request: {0}")]
    Write(#[source] io::Error),
    #[error("failed to read response: {0}")]
    Read(#[source] io::Error),
    #[error("request was cancelled")]
    Cancelled,
    #[error("server response cannot be parsed: {0}")]
    InvalidResponse(#[from] InvalidResponse),
}

impl RequestError {
    /// True when the request ended because `cancel()` was called.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled)
    }

    /// True when the server answered with bytes this client cannot parse.
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, RequestError::InvalidResponse(_))
    }
}
