//! Dial redirection.
//!
//! # Design
//! `ureq` asks its resolver for the socket addresses of whatever URI the
//! request targets. `ConnectResolver` sits in that seam: it keeps the port the
//! request URI implies and swaps the host for the caller's connect address.
//! The URI itself is untouched, so the TLS server name and the `Host` header
//! still come from the logical host. Actual name resolution of the connect
//! address is delegated to ureq's `DefaultResolver`.

use std::net::Ipv6Addr;

use ureq::config::Config;
use ureq::http::Uri;
use ureq::unversioned::resolver::{DefaultResolver, ResolvedSocketAddrs, Resolver};
use ureq::unversioned::transport::NextTimeout;

const HTTPS_PORT: u16 = 443;
const HTTP_PORT: u16 = 80;

/// Resolver that sends every connection to one fixed address.
#[derive(Debug)]
pub struct ConnectResolver {
    connect_address: String,
    inner: DefaultResolver,
}

impl ConnectResolver {
    pub fn new(connect_address: &str) -> Self {
        Self {
            connect_address: connect_address.to_string(),
            inner: DefaultResolver::default(),
        }
    }

    pub fn connect_address(&self) -> &str {
        &self.connect_address
    }

    /// `connect_address:port`, with bare IPv6 literals bracketed.
    pub fn target_authority(&self, port: u16) -> String {
        if self.connect_address.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]:{port}", self.connect_address)
        } else {
            format!("{}:{port}", self.connect_address)
        }
    }

    /// The URI ureq should actually resolve: the connect address on the port
    /// of the logical URI.
    fn target_uri(&self, uri: &Uri) -> Result<Uri, ureq::Error> {
        let scheme = uri.scheme_str().unwrap_or("https");
        let port = uri.port_u16().unwrap_or(match scheme {
            "http" => HTTP_PORT,
            _ => HTTPS_PORT,
        });
        Uri::builder()
            .scheme(scheme)
            .authority(self.target_authority(port).as_str())
            .path_and_query("/")
            .build()
            .map_err(|e| {
                ureq::Error::BadUri(format!("connect address {:?}: {e}", self.connect_address))
            })
    }
}

impl Resolver for ConnectResolver {
    fn resolve(
        &self,
        uri: &Uri,
        config: &Config,
        timeout: NextTimeout,
    ) -> Result<ResolvedSocketAddrs, ureq::Error> {
        let target = self.target_uri(uri)?;
        tracing::debug!(
            logical = ?uri.authority().map(|a| a.as_str()),
            target = ?target.authority().map(|a| a.as_str()),
            "redirecting dial"
        );
        self.inner.resolve(&target, config, timeout)
    }
}
