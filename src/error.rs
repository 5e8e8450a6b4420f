//! Error types for the wraith crate.

use std::time::Duration;

use crate::response::Response;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error type accepted from transports and transformers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by composition and execution.
///
/// Carries the failure kind plus the last response observed before the
/// failure, if the request got that far. Error transformers receive the
/// whole value and may rewrite either part.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,

    /// The last raw response seen before this error, if any.
    ///
    /// `None` when the failure happened before the transport produced a
    /// response (composition errors, connection failures, timeouts that
    /// beat the transport).
    pub response: Option<Response>,
}

/// Failure kinds surfaced by `compose` and `fetch`.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid descriptor state (missing URL, fetch without a transport).
    #[error("invalid request configuration: {0}")]
    Config(String),

    /// The transport did not settle within the configured window.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The cancellation signal fired before the transport settled.
    #[error("request aborted")]
    Aborted,

    /// Non-ok response converted to an error under simple mode.
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body was not valid UTF-8 text.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transport capability failed.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Error raised by a user-supplied transformer, carried unwrapped.
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ErrorKind::Config(message.into()).into()
    }

    /// Create a timeout error.
    pub fn timeout(after: Duration) -> Self {
        ErrorKind::Timeout(after).into()
    }

    /// Create an abort error.
    pub fn aborted() -> Self {
        ErrorKind::Aborted.into()
    }

    /// Create an HTTP status error.
    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        ErrorKind::Status {
            status,
            status_text: status_text.into(),
        }
        .into()
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        ErrorKind::Decode(message.into()).into()
    }

    /// Create a transport error from any boxable error.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        ErrorKind::Transport(err.into()).into()
    }

    /// Create an opaque error from any boxable error.
    ///
    /// Transformers use this to fail with their own error types; the
    /// original error stays reachable through `source()`.
    pub fn other(err: impl Into<BoxError>) -> Self {
        ErrorKind::Other(err.into()).into()
    }

    /// Attach the last observed response, keeping an earlier attachment
    /// if one exists.
    pub(crate) fn with_response(mut self, response: Option<Response>) -> Self {
        if self.response.is_none() {
            self.response = response;
        }
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            response: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        ErrorKind::Json(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = Error::status(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert!(err.response.is_none());
    }

    #[test]
    fn test_other_displays_inner_error() {
        let inner = std::io::Error::other("boom");
        let err = Error::other(inner);
        assert!(err.to_string().contains("boom"));
    }
}
