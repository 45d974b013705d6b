//! HTTPS requests whose dial target is decoupled from the server identity.
//!
//! # Overview
//! A [`RequestContext`] names the logical host and path (`host[:port]/path`)
//! that TLS authenticates and that the `Host` header carries, plus a separate
//! connect address the TCP connection actually goes to. Executing it yields a
//! [`ResponseHandle`] whose body the caller streams and then closes.
//!
//! # Design
//! - Transport and HTTP/1.1 framing are `ureq`'s. This crate plugs a
//!   [`ConnectResolver`] into ureq's resolver seam to redirect the dial, and
//!   otherwise only configures the agent.
//! - One request per execution: a fresh agent, no pooling, no redirects,
//!   no retries.
//! - Failures are values: `execute` returns `Result`, body reads return a
//!   `ReadResult` carrying both bytes and an optional terminal condition.
//!
//! ```no_run
//! use httpssni_core::RequestContext;
//!
//! let mut ctx = RequestContext::new("GET", "example.com/", "93.184.215.14");
//! ctx.set_header("Accept", "text/html").set_timeout(10);
//! let mut response = ctx.execute()?;
//! println!("{} {}", response.protocol(), response.status());
//! loop {
//!     let chunk = response.read(16 * 1024);
//!     // use chunk.bytes
//!     if chunk.error.is_some() {
//!         break;
//!     }
//! }
//! response.close();
//! # Ok::<(), httpssni_core::HttpsError>(())
//! ```

mod client;
pub mod dial;
pub mod error;
pub mod headers;
pub mod request;
pub mod response;

pub use dial::ConnectResolver;
pub use error::{HttpsError, StreamError};
pub use headers::{canonical_name, Headers};
pub use request::{RequestContext, RequestSpec, DEFAULT_TIMEOUT_SECS};
pub use response::{BodyState, ReadResult, ResponseHandle, UNKNOWN_LENGTH};
