use std::path::PathBuf;
use std::sync::Arc;

use khata_core::Config;

mod error;
mod ingest;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: khata_storage::DbPool,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("khata.toml"));
    let config = Config::load_or_default(&config_path)?;

    let db = khata_storage::create_db(&config.database.path).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
