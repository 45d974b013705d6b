use mock_server::TlsIdentity;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8443".to_string());
    let names = std::env::var("MOCK_SERVER_NAMES").unwrap_or_else(|_| "localhost".to_string());
    let names: Vec<&str> = names.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();

    let identity = TlsIdentity::self_signed(&names)?;
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, ?names, "listening");
    println!("{}", identity.certificate_pem());
    mock_server::run(listener, &identity).await?;
    Ok(())
}
