//! Error types for request execution and body streaming.
//!
//! # Design
//! `HttpsError` is what `execute` hands back when no response could be
//! produced. Timeouts get their own variant so callers can tell them apart,
//! but every variant carries the transport's own message as text; the C
//! surface only ever sees that text. `StreamError` is not returned through
//! `Result` at all: it rides inside a `ReadResult` next to the bytes of the
//! same read.

use thiserror::Error;

/// Failure of `RequestSpec::execute` before a response existed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpsError {
    /// Method or URL could not be turned into a request. No network activity
    /// happened.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request lifetime exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// DNS, connect, TLS or HTTP protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ureq::Error> for HttpsError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => HttpsError::Timeout(err.to_string()),
            ureq::Error::BadUri(_) | ureq::Error::Http(_) => {
                HttpsError::InvalidRequest(err.to_string())
            }
            ureq::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => {
                HttpsError::Timeout(err.to_string())
            }
            other => HttpsError::Transport(other.to_string()),
        }
    }
}

/// Why a body read produced no more data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The body has been read to the end.
    #[error("EOF")]
    Eof,

    /// `close` was called on the response.
    #[error("read on closed response body")]
    Closed,

    /// The underlying connection failed or timed out mid-body.
    #[error("{0}")]
    Io(String),
}
