//! # relayhubd — relayhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialize logging
//! - Open one output line per configured relay (sysfs GPIO or virtual)
//! - Construct the registry and application services
//! - Restore relay levels and daily schedules from the JSON document
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod output;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use relayhub_adapter_http_axum::state::AppState;
use relayhub_adapter_storage_json::JsonFileStore;
use relayhub_app::ports::LocalClock;
use relayhub_app::registry::RelayRegistry;
use relayhub_app::scheduler::SchedulerEngine;
use relayhub_app::services::relay_service::RelayService;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::load()?);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Outputs are opened before the listener is bound.
    let outputs = output::open_all_blocking(Arc::clone(&config)).await?;
    tracing::info!(
        relays = outputs.len(),
        backend = ?config.outputs.backend,
        "relay outputs ready"
    );

    // Registry and services
    let store = JsonFileStore::new(&config.storage.path);
    let registry = Arc::new(RelayRegistry::new(outputs, store, LocalClock));
    let scheduler = Arc::new(SchedulerEngine::new(Arc::clone(&registry)));
    let relay_service = Arc::new(RelayService::new(Arc::clone(&registry)));

    let report = scheduler.restore().await?;
    tracing::info!(
        fresh = report.fresh,
        relays = report.relays,
        schedules = report.schedules,
        path = %config.storage.path.display(),
        "relay state restored"
    );
    for (port, schedule) in scheduler.schedules().await {
        tracing::info!(%port, %schedule, "daily window active");
    }

    // HTTP
    let state = AppState::new(relay_service, scheduler, config.auth.api_key.as_str());
    let app = relayhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("relayhubd listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("relayhubd stopped");
    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received, stopping");
}
