use packgate_server::{AppState, ServerConfig, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .compact()
        .with_target(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        pack = %config.pack_path.display(),
        driver = ?config.driver,
        "starting packgate"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config);

    let listener = TcpListener::bind(&addr).await?;
    info!("server listening at {addr}");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
