use anyhow::Context;
use axum::{routing::get, Router};
use clap::Parser;
use sqlx::sqlite::SqlitePool;
use table_viewer::GatewayLayer;
use tracing_subscriber::EnvFilter;

mod database;

/// SQLite-backed table gateway
#[derive(Debug, Parser)]
#[command(name = "gateway-server", version, about)]
struct Config {
    /// SQLite connection string
    #[arg(
        long,
        env = "VIEWER_DATABASE_URL",
        default_value = "sqlite:./data/example.db?mode=rwc"
    )]
    database_url: String,

    /// Address to listen on
    #[arg(long, env = "VIEWER_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Path the gateway endpoints are mounted under
    #[arg(long, env = "VIEWER_BASE_PATH", default_value = "/api")]
    base_path: String,

    /// Skip creating and filling the sample tables
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let pool = SqlitePool::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.database_url))?;

    if !config.no_seed {
        database::setup(&pool)
            .await
            .context("failed to set up sample tables")?;
    }

    let gateway = GatewayLayer::sqlite(config.base_path.as_str(), pool);
    let base_path = gateway.base_path().to_string();

    let app = Router::new()
        .route("/", get(root_handler))
        .merge(gateway.into_router());

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let address = listener.local_addr()?;

    tracing::info!(%address, base_path = %base_path, "gateway listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn root_handler() -> &'static str {
    "table-viewer gateway server"
}
