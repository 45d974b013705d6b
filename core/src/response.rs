//! Streaming response handle.
//!
//! # Design
//! A `ResponseHandle` owns the read side of the connection that produced it.
//! Status, protocol and headers are captured up front; the body is only ever
//! pulled by explicit `read` calls. The body moves through three states:
//!
//! ```text
//! Open --(read hits end)--> Exhausted --(close)--> Closed
//!   \-------------------------(close)-----------------^
//! ```
//!
//! Reads never fail through `Result`: each `ReadResult` carries the bytes of
//! that read together with an optional terminal condition, so a caller checks
//! both. Dropping the handle releases the connection as well, but `close`
//! is the explicit way to do it and may be called more than once.

use std::io::{self, Read};

use ureq::http;

use crate::error::StreamError;
use crate::headers::Headers;

/// Sentinel for an unknown body length.
pub const UNKNOWN_LENGTH: i64 = -1;

/// Outcome of one `ResponseHandle::read` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadResult {
    /// Exactly the bytes this read produced.
    pub bytes: Vec<u8>,
    /// Set once the body can yield nothing more (or the read failed).
    pub error: Option<StreamError>,
}

impl ReadResult {
    pub fn bytes_read(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.error, Some(StreamError::Eof))
    }

    fn data(bytes: Vec<u8>) -> Self {
        Self { bytes, error: None }
    }

    fn failed(error: StreamError) -> Self {
        Self {
            bytes: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Open,
    Exhausted,
    Closed,
}

pub struct ResponseHandle {
    status: u16,
    protocol: String,
    headers: Headers,
    content_length: i64,
    state: BodyState,
    body: Option<Box<dyn Read + Send>>,
}

impl std::fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandle")
            .field("status", &self.status)
            .field("protocol", &self.protocol)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ResponseHandle {
    pub(crate) fn new(
        status: u16,
        protocol: String,
        headers: Headers,
        content_length: i64,
        body: Box<dyn Read + Send>,
    ) -> Self {
        Self {
            status,
            protocol,
            headers,
            content_length,
            state: BodyState::Open,
            body: Some(body),
        }
    }

    /// Wrap a response from the HTTP stack. Only the first value of a
    /// repeated header is kept.
    pub(crate) fn from_http(response: http::Response<ureq::Body>) -> Self {
        let status = response.status().as_u16();
        let protocol = format!("{:?}", response.version());

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.insert_first(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        let content_length = declared_length(response.headers());

        let body = response.into_body().into_reader();
        Self::new(status, protocol, headers, content_length, Box::new(body))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Negotiated protocol, e.g. `HTTP/1.1`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Declared body length, or [`UNKNOWN_LENGTH`].
    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    /// Value of `name`, or `""` when the response did not carry it.
    pub fn get_header(&self, name: &str) -> &str {
        self.headers.get(name).unwrap_or("")
    }

    /// Visit every header in unspecified order until `visitor` returns false.
    pub fn for_each_header<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (name, value) in self.headers.iter() {
            if !visitor(name, value) {
                break;
            }
        }
    }

    /// Read at most `max_size` bytes of body.
    pub fn read(&mut self, max_size: usize) -> ReadResult {
        let body = match (self.state, self.body.as_mut()) {
            (BodyState::Open, Some(body)) => body,
            (BodyState::Closed, _) | (_, None) => return ReadResult::failed(StreamError::Closed),
            (BodyState::Exhausted, _) => return ReadResult::failed(StreamError::Eof),
        };
        if max_size == 0 {
            return ReadResult::default();
        }

        let mut buf = vec![0u8; max_size];
        loop {
            match body.read(&mut buf) {
                Ok(0) => {
                    tracing::trace!("response body exhausted");
                    self.state = BodyState::Exhausted;
                    return ReadResult::failed(StreamError::Eof);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return ReadResult::data(buf);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "response body read failed");
                    return ReadResult::failed(StreamError::Io(e.to_string()));
                }
            }
        }
    }

    /// Release the connection. Returns true on success; closing an already
    /// closed handle is a no-op that also succeeds.
    pub fn close(&mut self) -> bool {
        if self.state != BodyState::Closed {
            tracing::trace!(state = ?self.state, "closing response body");
        }
        self.body = None;
        self.state = BodyState::Closed;
        true
    }
}

impl Read for ResponseHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = ResponseHandle::read(self, buf.len());
        match result.error {
            None => {
                buf[..result.bytes.len()].copy_from_slice(&result.bytes);
                Ok(result.bytes.len())
            }
            Some(StreamError::Eof) => Ok(0),
            Some(StreamError::Closed) => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                StreamError::Closed,
            )),
            Some(StreamError::Io(msg)) => Err(io::Error::other(msg)),
        }
    }
}

/// Body length from `Content-Length`, unless the body is chunked.
fn declared_length(headers: &http::HeaderMap) -> i64 {
    if headers.contains_key(http::header::TRANSFER_ENCODING) {
        return UNKNOWN_LENGTH;
    }
    headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n >= 0)
        .unwrap_or(UNKNOWN_LENGTH)
}
