//! Portal API Server
//!
//! OGC WMS/WFS/WCS gateway for the S-100 maritime products.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use portal_api::state::{AppState, Settings};

/// Portal API Server
#[derive(Parser, Debug)]
#[command(name = "portal-api")]
#[command(about = "OGC WMS/WFS/WCS server for S-100 maritime products")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "PORTAL_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "PORTAL_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Directory holding provider.yaml and services/*.yaml
    #[arg(long, default_value = "config", env = "PORTAL_CONFIG_DIR")]
    config_dir: PathBuf,

    /// PostgreSQL dataset catalog; the in-memory catalog is used when unset
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Public base URL used in capabilities documents
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,

    /// YAML dataset seed for the in-memory catalog
    #[arg(long, env = "PORTAL_SEED_FILE")]
    seed_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus = portal_api::metrics::install_recorder()?;
    info!("Prometheus metrics exporter initialized");
    info!("Starting portal API server");

    let settings = Settings {
        config_dir: args.config_dir,
        database_url: args.database_url,
        public_url: args.public_url,
        seed_file: args.seed_file,
    };
    let state = Arc::new(AppState::new(&settings, Some(prometheus)).await?);
    info!(services = ?state.registry.service_codes().await, "Products registered");

    let app = portal_api::build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
