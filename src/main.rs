//! Operadoras API Server
//!
//! Run with: cargo run --bin operadoras-api
//!
//! # Configuration
//!
//! Loaded from a TOML file (see [`operadoras::config::Config`]) with
//! environment variable overrides:
//! - `OPERADORAS_EXPENSES_CSV`: Path of the expense CSV
//! - `OPERADORAS_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `OPERADORAS_API_PORT`: Port to listen on (default: 8080)
//! - `OPERADORAS_CACHE_TTL_SECS`: Statistics cache TTL
//! - `OPERADORAS_LOG_LEVEL` / `OPERADORAS_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely when set

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use operadoras::api::{serve, AppState};
use operadoras::cache::TtlCache;
use operadoras::config::Config;
use operadoras::service::DataService;
use operadoras::store::DatasetStore;

#[derive(Parser, Debug)]
#[command(name = "operadoras-api", version, about = "Operator expense read API")]
struct Cli {
    /// Path to a TOML config file. Defaults to the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured bind port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured expense CSV path.
    #[arg(long)]
    data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(data) = cli.data {
        config.data.expenses_csv = data.display().to_string();
    }

    init_tracing(&config);

    tracing::info!("Starting Operadoras API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Expense source: {}", config.data.expenses_csv);

    let store = Arc::new(DatasetStore::new(&config.data.expenses_csv));

    // Load the snapshot up front so a structurally broken source fails the
    // process at startup instead of on the first request.
    let snapshot = store
        .snapshot()
        .with_context(|| format!("loading expense data from {}", config.data.expenses_csv))?;
    tracing::info!("Loaded {} expense records", snapshot.len());

    let cache = TtlCache::new(
        Duration::from_secs(config.cache.ttl_seconds),
        config.cache.max_entries,
    );
    let service = Arc::new(DataService::new(Arc::clone(&store), cache));

    let state = AppState::new(service, config.api.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    tracing::info!("Operadoras API server stopped");
    Ok(())
}

/// Initialize tracing from the logging config. `RUST_LOG` wins when set.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("operadoras={},tower_http=info", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
