//! Request description: a mutable builder and the immutable value it yields.
//!
//! # Design
//! `RequestContext` accumulates parameters through setters that never fail.
//! `execute` snapshots the context into a `RequestSpec` first and runs that,
//! so nothing the caller does to the context afterwards can affect a request
//! in flight, and a context can be executed any number of times.

use std::time::Duration;

use crate::client;
use crate::error::HttpsError;
use crate::headers::Headers;
use crate::response::ResponseHandle;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Immutable description of one HTTPS request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: String,
    host_path: String,
    connect_address: String,
    headers: Headers,
    body: Option<Vec<u8>>,
    skip_verify: bool,
    timeout_secs: u64,
    root_certificates: Vec<Vec<u8>>,
}

impl RequestSpec {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Logical `host[:port]/path?query`.
    pub fn host_path(&self) -> &str {
        &self.host_path
    }

    pub fn connect_address(&self) -> &str {
        &self.connect_address
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn skip_verify(&self) -> bool {
        self.skip_verify
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// `None` when the timeout is disabled (zero seconds).
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// DER trust anchors that replace the default roots when non-empty.
    pub fn root_certificates(&self) -> &[Vec<u8>] {
        &self.root_certificates
    }

    /// The request URL: always HTTPS, host and path taken verbatim.
    pub fn url(&self) -> String {
        format!("https://{}", self.host_path)
    }

    pub fn execute(&self) -> Result<ResponseHandle, HttpsError> {
        client::execute(self)
    }
}

/// Mutable builder for a [`RequestSpec`].
#[derive(Debug, Clone)]
pub struct RequestContext {
    spec: RequestSpec,
}

impl RequestContext {
    /// `host_path` names the server identity (`host[:port]/path`), while
    /// `connect_address` is where the TCP connection actually goes.
    pub fn new(method: &str, host_path: &str, connect_address: &str) -> Self {
        Self {
            spec: RequestSpec {
                method: method.to_string(),
                host_path: host_path.to_string(),
                connect_address: connect_address.to_string(),
                headers: Headers::new(),
                body: None,
                skip_verify: false,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                root_certificates: Vec::new(),
            },
        }
    }

    pub fn set_skip_verify(&mut self, skip: bool) -> &mut Self {
        self.spec.skip_verify = skip;
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.spec.headers.set(name, value);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.spec.body = Some(body.into());
        self
    }

    /// Zero disables the timeout.
    pub fn set_timeout(&mut self, seconds: u64) -> &mut Self {
        self.spec.timeout_secs = seconds;
        self
    }

    pub fn add_root_certificate(&mut self, der: impl Into<Vec<u8>>) -> &mut Self {
        self.spec.root_certificates.push(der.into());
        self
    }

    /// Snapshot of the current parameters.
    pub fn spec(&self) -> RequestSpec {
        self.spec.clone()
    }

    pub fn execute(&self) -> Result<ResponseHandle, HttpsError> {
        self.spec().execute()
    }
}
