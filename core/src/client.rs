//! Request execution.
//!
//! # Design
//! Every execution builds its own single-use `ureq::Agent`. The agent gets a
//! [`ConnectResolver`] in place of the default resolver, which is the only
//! thing that differs from an ordinary HTTPS call: the request URI, the TLS
//! server name and the `Host` header all still name the logical host. The
//! agent is configured to behave like a bare transport: statuses are data,
//! redirects are returned rather than followed, environment proxies are
//! ignored and no idle connections are kept.

use std::sync::Arc;

use ureq::http;
use ureq::tls::{Certificate, RootCerts, TlsConfig};
use ureq::unversioned::transport::DefaultConnector;
use ureq::Agent;

use crate::dial::ConnectResolver;
use crate::error::HttpsError;
use crate::request::RequestSpec;
use crate::response::ResponseHandle;

pub(crate) fn execute(spec: &RequestSpec) -> Result<ResponseHandle, HttpsError> {
    let request = build_request(spec)?;
    let agent = build_agent(spec);

    tracing::debug!(
        method = spec.method(),
        url = %spec.url(),
        connect = spec.connect_address(),
        skip_verify = spec.skip_verify(),
        timeout_secs = spec.timeout_secs(),
        "executing request"
    );

    let result = match spec.body() {
        Some(body) => agent.run(request.body(body.to_vec()).map_err(invalid)?),
        None => agent.run(request.body(()).map_err(invalid)?),
    };

    match result {
        Ok(response) => {
            let handle = ResponseHandle::from_http(response);
            tracing::debug!(
                status = handle.status(),
                content_length = handle.content_length(),
                "response received"
            );
            Ok(handle)
        }
        Err(err) => {
            let err = HttpsError::from(err);
            tracing::debug!(error = %err, "request failed");
            Err(err)
        }
    }
}

/// Validate method and URL and attach headers. Nothing touches the network
/// here.
fn build_request(spec: &RequestSpec) -> Result<http::request::Builder, HttpsError> {
    let method = http::Method::from_bytes(spec.method().as_bytes())
        .map_err(|e| HttpsError::InvalidRequest(format!("method {:?}: {e}", spec.method())))?;

    let url = spec.url();
    let uri: http::Uri = url
        .parse()
        .map_err(|e| HttpsError::InvalidRequest(format!("url {url:?}: {e}")))?;
    if uri.host().map_or(true, str::is_empty) {
        return Err(HttpsError::InvalidRequest(format!("url {url:?}: missing host")));
    }

    let mut builder = http::Request::builder().method(method).uri(uri);
    for (name, value) in spec.headers().iter() {
        builder = builder.header(name, value);
    }
    Ok(builder)
}

fn build_agent(spec: &RequestSpec) -> Agent {
    let config = Agent::config_builder()
        .http_status_as_error(false)
        .allow_non_standard_methods(true)
        .max_redirects(0)
        .max_redirects_will_error(false)
        .proxy(None)
        .max_idle_connections(0)
        .max_idle_connections_per_host(0)
        .timeout_global(spec.timeout())
        .tls_config(tls_config(spec))
        .build();

    Agent::with_parts(
        config,
        DefaultConnector::default(),
        ConnectResolver::new(spec.connect_address()),
    )
}

fn tls_config(spec: &RequestSpec) -> TlsConfig {
    let mut builder = TlsConfig::builder().disable_verification(spec.skip_verify());
    if !spec.root_certificates().is_empty() {
        let roots: Vec<Certificate<'static>> = spec
            .root_certificates()
            .iter()
            .map(|der| Certificate::from_der(der).to_owned())
            .collect();
        builder = builder.root_certs(RootCerts::Specific(Arc::new(roots)));
    }
    builder.build()
}

fn invalid(err: http::Error) -> HttpsError {
    HttpsError::InvalidRequest(err.to_string())
}
