//! pawcache server entry point.
//!
//! Boots the worker (install, then activate) and serves it over MCP on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use pawcache_client::{FetchClient, FetchConfig, ServiceWorker};
use pawcache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache at {}", config.db_path.display()))?;
    let client = FetchClient::new(FetchConfig::from_app_config(&config)?)?;
    let worker = Arc::new(ServiceWorker::from_app_config(&config, db, Arc::new(client))?);

    tracing::info!(cache = %config.cache_name, origin = %config.origin, "starting pawcache worker");

    // A failed boot leaves the worker available for explicit install/activate calls.
    match worker.start().await {
        Ok(state) => tracing::info!(%state, "worker ready"),
        Err(e) => tracing::error!(error = %e, "worker boot failed"),
    }

    let handler = handler::PawcacheServer::new(worker.clone(), Arc::new(config));
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;
    worker.settle().await;

    Ok(())
}
