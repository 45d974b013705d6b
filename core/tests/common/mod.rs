//! Shared setup: a TLS mock server on a random port, served from a background
//! thread with its own tokio runtime.
#![allow(dead_code)]

use std::net::SocketAddr;

use httpssni_core::{RequestContext, ResponseHandle};
use mock_server::{EchoReport, TlsIdentity};

/// Name on the server certificate. It is not resolvable, so any request that
/// reaches the server must have been dialed through the connect address.
pub const LOGICAL_HOST: &str = "sni.test";

pub struct TestServer {
    pub addr: SocketAddr,
    pub identity: TlsIdentity,
}

impl TestServer {
    pub fn start() -> Self {
        let identity = TlsIdentity::self_signed(&[LOGICAL_HOST]).unwrap();
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        let server_identity = identity.clone();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, &server_identity).await
            })
            .unwrap();
        });

        Self { addr, identity }
    }

    /// `host:port/path` for the given logical host on this server's port.
    pub fn host_path_for(&self, host: &str, path: &str) -> String {
        format!("{host}:{}{path}", self.addr.port())
    }

    pub fn host_path(&self, path: &str) -> String {
        self.host_path_for(LOGICAL_HOST, path)
    }

    /// Context for `path` that dials the loopback address and trusts the
    /// server's certificate.
    pub fn context(&self, method: &str, path: &str) -> RequestContext {
        let mut ctx = RequestContext::new(method, &self.host_path(path), "127.0.0.1");
        ctx.add_root_certificate(self.identity.certificate_der());
        ctx
    }
}

/// Drain the body with fixed-size reads, then close.
pub fn read_body(response: &mut ResponseHandle) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let chunk = response.read(4096);
        body.extend_from_slice(&chunk.bytes);
        if let Some(err) = &chunk.error {
            assert!(chunk.is_eof(), "body read failed: {err}");
            break;
        }
    }
    assert!(response.close());
    body
}

pub fn echo(response: &mut ResponseHandle) -> EchoReport {
    serde_json::from_slice(&read_body(response)).unwrap()
}
