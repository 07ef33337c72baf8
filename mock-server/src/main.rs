use mock_server::Store;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mock_server=debug,tower_http=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let store = match std::env::var("SEED_FILE") {
        Ok(path) => {
            let export = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            let store = Store::from_export(export)
                .ok_or_else(|| format!("{path}: expected an object of collections"))?;
            info!(%path, "seeded store");
            store
        }
        Err(_) => Store::default(),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    mock_server::serve(listener, store).await?;
    Ok(())
}
