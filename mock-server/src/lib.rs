//! TLS test server for the httpssni client.
//!
//! # Design
//! Serves an axum `Router` over a rustls listener whose certificate is a
//! freshly generated self-signed one. The listener records the SNI name the
//! client announced and stamps every TLS connection with a UUID, both of which
//! the `/echo` route reports back. That lets tests observe what actually went
//! over the wire: which name the handshake used, which `Host` header arrived,
//! and whether two requests shared a connection.

use std::{collections::BTreeMap, io, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{connect_info::Connected, ConnectInfo, Path, Request},
    http::{
        header::{CONTENT_TYPE, HOST, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::{any, get},
    serve::{IncomingStream, Listener},
    Json, Router,
};
use rustls::{
    pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer},
    ServerConfig,
};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::{server::TlsStream, TlsAcceptor};
use uuid::Uuid;

/// Upper bound on request bodies the echo route will buffer.
const MAX_ECHO_BODY: usize = 1 << 20;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Self-signed certificate and key the server presents.
#[derive(Clone)]
pub struct TlsIdentity {
    cert: CertificateDer<'static>,
    cert_pem: String,
    key: Vec<u8>,
}

impl TlsIdentity {
    /// Generate a certificate valid for every name in `names`.
    pub fn self_signed(names: &[&str]) -> Result<Self, rcgen::Error> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let certified = rcgen::generate_simple_self_signed(names)?;
        Ok(Self {
            cert: certified.cert.der().clone(),
            cert_pem: certified.cert.pem(),
            key: certified.key_pair.serialize_der(),
        })
    }

    /// DER encoding of the certificate, usable as a client trust anchor.
    pub fn certificate_der(&self) -> &[u8] {
        self.cert.as_ref()
    }

    pub fn certificate_pem(&self) -> &str {
        &self.cert_pem
    }

    fn server_config(&self) -> Result<ServerConfig, rustls::Error> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.clone()));
        ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(vec![self.cert.clone()], key)
    }
}

/// What the listener learned about a TLS connection during the handshake.
#[derive(Clone, Debug)]
pub struct PeerInfo {
    pub remote: SocketAddr,
    pub server_name: Option<String>,
    pub connection_id: Uuid,
}

impl Connected<IncomingStream<'_, TlsListener>> for PeerInfo {
    fn connect_info(stream: IncomingStream<'_, TlsListener>) -> Self {
        stream.remote_addr().clone()
    }
}

/// TCP listener that completes a TLS handshake before handing the stream to
/// axum. Connections whose handshake fails are logged and skipped.
pub struct TlsListener {
    tcp: TcpListener,
    acceptor: TlsAcceptor,
}

impl TlsListener {
    pub fn new(tcp: TcpListener, config: Arc<ServerConfig>) -> Self {
        Self {
            tcp,
            acceptor: TlsAcceptor::from(config),
        }
    }
}

impl Listener for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Addr = PeerInfo;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        loop {
            let (stream, remote) = match self.tcp.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::debug!(%err, "tcp accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };
            let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, self.acceptor.accept(stream));
            match handshake.await {
                Ok(Ok(tls)) => {
                    let server_name = tls.get_ref().1.server_name().map(str::to_owned);
                    let peer = PeerInfo {
                        remote,
                        server_name,
                        connection_id: Uuid::new_v4(),
                    };
                    tracing::debug!(?peer, "tls connection accepted");
                    return (tls, peer);
                }
                Ok(Err(err)) => tracing::debug!(%remote, %err, "tls handshake failed"),
                Err(_) => tracing::debug!(%remote, "tls handshake timed out"),
            }
        }
    }

    fn local_addr(&self) -> io::Result<Self::Addr> {
        Ok(PeerInfo {
            remote: self.tcp.local_addr()?,
            server_name: None,
            connection_id: Uuid::nil(),
        })
    }
}

/// Everything `/echo` saw about the request that reached it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoReport {
    pub method: String,
    pub path: String,
    pub host: Option<String>,
    pub server_name: Option<String>,
    pub connection_id: Option<Uuid>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/bytes/{len}", get(bytes))
        .route("/headers", get(headers))
        .route("/delay/{millis}", get(delay))
        .route("/status/{code}", any(status))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener, identity: &TlsIdentity) -> Result<(), io::Error> {
    let config = identity.server_config().map_err(io::Error::other)?;
    let listener = TlsListener::new(listener, Arc::new(config));
    axum::serve(
        listener,
        app().into_make_service_with_connect_info::<PeerInfo>(),
    )
    .await
}

/// Deterministic body served by `/bytes/{len}`.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

async fn echo(request: Request) -> Result<Json<EchoReport>, StatusCode> {
    let (parts, body) = request.into_parts();
    let peer = parts.extensions.get::<ConnectInfo<PeerInfo>>().map(|c| &c.0);
    let body = axum::body::to_bytes(body, MAX_ECHO_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Ok(Json(EchoReport {
        method: parts.method.to_string(),
        path: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string()),
        host: parts
            .headers
            .get(HOST)
            .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned()),
        server_name: peer.and_then(|p| p.server_name.clone()),
        connection_id: peer.map(|p| p.connection_id),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}

async fn bytes(Path(len): Path<usize>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/octet-stream")],
        Body::from(pattern(len)),
    )
}

async fn headers() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.insert("x-single", HeaderValue::from_static("one"));
    headers.append("x-multi", HeaderValue::from_static("first"));
    headers.append("x-multi", HeaderValue::from_static("second"));
    (headers, "headers")
}

async fn delay(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "done"
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, "/echo")])
}
