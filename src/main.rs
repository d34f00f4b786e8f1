// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use efficiency_tracker::{
    api::router,
    config::RuntimeConfig,
    state::AppState,
    storage::{DataRepository, ObjectStore},
};

#[tokio::main]
async fn main() {
    init_tracing();

    // Configuration errors are fatal; nothing should start half-configured.
    let config = match RuntimeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "configuration error");
            std::process::exit(1);
        }
    };

    if config.development_mode {
        tracing::warn!("running in development mode");
    }

    let store = match ObjectStore::from_config(&config).await {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize storage backend");
            std::process::exit(1);
        }
    };
    if let Err(err) = store.probe().await {
        tracing::warn!(error = %err, backend = %store.describe(), "storage probe failed");
    }

    let addr: SocketAddr = match format!("{}:{}", config.bind_host, config.bind_port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(error = %err, host = %config.bind_host, "invalid bind address");
            std::process::exit(1);
        }
    };

    let state = AppState::new(DataRepository::new(store), config);
    let app = router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "efficiency tracker listening (docs at /api/docs)");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}

/// Structured logs to stdout. `LOG_FORMAT=json` switches to JSON lines;
/// anything else keeps the human-readable format.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
