// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pingback Endpoint Service
//!
//! Receives `pingback.ping` calls, validates them against the source page
//! and replies with an XML-RPC success or fault response.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `PINGBACK_PATH`: Endpoint path (default: /xmlrpc)
//! - `PINGBACK_LOCAL_HOSTS`: Comma separated hosts we accept pingbacks for
//!   (default: any)
//! - `BLOCK_SELF_PING`: Refuse pingbacks from our own hosts (default: true)
//! - `FETCH_TIMEOUT_MS`: Timeout for fetching source pages (default: 10000)
//! - `REGISTRY_RETENTION_SECS`: Duplicate detection window (default: 86400)
//!
//! Advertise the endpoint from every pingable page with an
//! `X-Pingback: https://example.org/xmlrpc` header or
//! `<link rel="pingback" href="https://example.org/xmlrpc">`.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pingback::{
    config::Config,
    handlers::{router, AppState},
    transport::ReqwestClient,
};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        endpoint_path = %config.endpoint_path,
        local_hosts = ?config.policy.local_hosts,
        fetch_timeout_ms = config.transport.fetch_timeout_ms,
        "Starting Pingback endpoint"
    );

    // The blocking client runs its own runtime, so it is built and dropped
    // outside of ours.
    let client = Arc::new(ReqwestClient::new(&config.transport)?);
    let state = Arc::new(AppState::new(config, client));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(state.clone()))?;
    drop(runtime);
    drop(state);

    Ok(())
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(cleanup_state.config.registry.cleanup_interval());
        loop {
            interval.tick().await;
            cleanup_state.registry.cleanup().await;
        }
    });

    let addr: SocketAddr = state.config.bind_addr.parse()?;
    let app = router(state);

    // Start server
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
