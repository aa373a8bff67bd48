//! CometBlue Service - simulated thermostat host with an HTTP API.
//!
//! Run with: `cargo run -p cometblue-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use cometblue_core::{MockDriverFactory, resolver};
use cometblue_service::{Collector, Config, api, build_state};

/// CometBlue Service - thermostat host and HTTP REST API.
///
/// Thermostats are simulated; embedders wanting real hardware build the
/// state with their own driver factory.
#[derive(Parser, Debug)]
#[command(name = "cometblue-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Disable the background update loop (API only mode).
    #[arg(long)]
    no_collector: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cometblue_service=info".parse()?)
                .add_directive("cometblue_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let addr: SocketAddr = config.server.bind.parse()?;
    info!("Setting up {} thermostat(s)", config.devices.len());
    let state = build_state(
        config,
        &MockDriverFactory::simulated(),
        &resolver::default_resolver(),
    )?;

    if !args.no_collector {
        Collector::new(Arc::clone(&state)).start().await;
    } else {
        info!("Background collector disabled");
    }

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(Arc::clone(&state));

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    state.collector.signal_stop();
    Ok(())
}
