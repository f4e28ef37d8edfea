//! ptax-va - Property tax assessment check service
//!
//! **Module Identity:**
//! - Name: ptax-va (Valuation & Assessment)
//! - Port: 5730 (configurable)
//!
//! Serves `POST /api/analyze`, `GET /api/property`, `GET /health` and
//! `GET /api/buildinfo`. Property data comes from the upstream HTTP API or,
//! with `--fixture`, from a local JSON file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use ptax_va::config::{CliOverrides, ProviderKind, ServiceConfig};
use ptax_va::providers::{FixtureProvider, HttpPropertyClient, PropertyDataProvider, ValuationProvider};
use ptax_va::{build_router, AppState};

/// Command-line arguments for ptax-va
#[derive(Parser, Debug)]
#[command(name = "ptax-va")]
#[command(about = "Property tax assessment check service")]
#[command(version)]
struct Args {
    /// Config file (overrides PTAX_CONFIG and the per-user file)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "PTAX_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PTAX_PORT")]
    port: Option<u16>,

    /// Serve property data from a JSON fixture instead of the upstream API
    #[arg(short, long, env = "PTAX_FIXTURE")]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise info until the config file says otherwise
    let env_filter = EnvFilter::try_from_default_env();
    let rust_log_set = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ptax-va v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let overrides = CliOverrides {
        host: args.host,
        port: args.port,
        fixture: args.fixture,
    };
    let config = ServiceConfig::load(args.config.as_deref(), &overrides)
        .context("Failed to load configuration")?;

    if !rust_log_set {
        match EnvFilter::try_new(&config.logging.level) {
            Ok(level) => filter_handle
                .reload(level)
                .context("Failed to apply configured log level")?,
            Err(e) => warn!(level = %config.logging.level, error = %e, "Invalid log level, keeping info"),
        }
    }

    let (property_provider, valuation_provider) = build_providers(&config)?;
    info!(provider = property_provider.name(), "Property data provider ready");

    let addr = config.server.bind_addr();
    let state = AppState::new(property_provider, valuation_provider, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// One backend serves both the property and the AVM capability
fn build_providers(
    config: &ServiceConfig,
) -> Result<(Arc<dyn PropertyDataProvider>, Option<Arc<dyn ValuationProvider>>)> {
    let p = &config.provider;
    match p.kind {
        ProviderKind::Fixture => {
            let path = p
                .fixture_path
                .as_deref()
                .context("Fixture provider selected without a fixture path")?;
            let provider = Arc::new(
                FixtureProvider::from_file(path)
                    .with_context(|| format!("Failed to load fixture {}", path.display()))?,
            );
            let property: Arc<dyn PropertyDataProvider> = provider.clone();
            let valuation: Arc<dyn ValuationProvider> = provider;
            Ok((property, Some(valuation)))
        }
        ProviderKind::Http => {
            info!(base_url = %p.base_url, "Using upstream property data API");
            let client = Arc::new(
                HttpPropertyClient::new(
                    &p.base_url,
                    p.api_key.clone(),
                    p.timeout(),
                    p.requests_per_second,
                    p.comparable_limit,
                )
                .context("Failed to build HTTP client")?,
            );
            let property: Arc<dyn PropertyDataProvider> = client.clone();
            let valuation: Arc<dyn ValuationProvider> = client;
            Ok((property, Some(valuation)))
        }
    }
}

/// Graceful shutdown on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
