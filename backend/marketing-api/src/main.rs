use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketing_api::config::{Config, LogFormat, StorageBackend};
use marketing_api::db::Database;
use marketing_api::repository::Repositories;
use marketing_api::{build_router, AppState};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marketing_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    init_tracing(config.logging.format);
    tracing::info!("Configuration loaded successfully");

    let repos = match config.database.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config).await?;
            db.run_migrations().await?;
            Repositories::postgres(db.pg)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(config.clone(), repos);
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
