//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the rule document and build the registry
//! - Bind both listeners and start serving
//! - Stop both listeners together on shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when rules are loaded)
//! - If either listener stops on its own, the other is shut down too

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinSet};

use crate::admin::AdminServer;
use crate::config::RouterConfig;
use crate::http::proxy::{build_client, HttpClient};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::Registry;
use crate::store::{JsonFileStore, StoreError};

/// Errors that keep the router from starting or running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot load rules: {0}")]
    Store(#[from] StoreError),

    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("cannot start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("listener failed: {0}")]
    Serve(#[from] io::Error),

    #[error("listener task aborted: {0}")]
    Join(#[from] JoinError),
}

/// Both listeners, serving.
pub struct RunningRouter {
    entry_addr: SocketAddr,
    manage_addr: SocketAddr,
    registry: Arc<Registry>,
    shutdown: Shutdown,
    tasks: JoinSet<Result<(), io::Error>>,
}

impl RunningRouter {
    pub fn entry_addr(&self) -> SocketAddr {
        self.entry_addr
    }

    pub fn manage_addr(&self) -> SocketAddr {
        self.manage_addr
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Serve until a shutdown signal arrives or a listener stops.
    pub async fn run_until_signal(mut self) -> Result<(), StartupError> {
        tokio::select! {
            _ = signals::wait_for_signal() => {}
            Some(result) = self.tasks.join_next() => {
                tracing::error!("A listener stopped unexpectedly; shutting down");
                self.shutdown.trigger();
                result??;
            }
        }
        self.shutdown().await
    }

    /// Stop both listeners and wait for in-flight requests to drain.
    pub async fn shutdown(mut self) -> Result<(), StartupError> {
        self.shutdown.trigger();
        while let Some(result) = self.tasks.join_next().await {
            result??;
        }
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// Load rules from the configured document and start both listeners.
pub async fn start(config: &RouterConfig) -> Result<RunningRouter, StartupError> {
    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr = address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let client = build_client();
    let store = Arc::new(JsonFileStore::new(&config.storage.rules_path));
    tracing::info!(path = %config.storage.rules_path, "Loading rules");
    let registry = Arc::new(Registry::load(store, &client)?);

    start_with_registry(config, registry, client).await
}

/// Start both listeners over an existing registry.
pub async fn start_with_registry(
    config: &RouterConfig,
    registry: Arc<Registry>,
    client: HttpClient,
) -> Result<RunningRouter, StartupError> {
    let entry = bind(config.listener.main_address()).await?;
    let manage = bind(config.listener.manage_address()).await?;
    let entry_addr = entry.local_addr()?;
    let manage_addr = manage.local_addr()?;

    let shutdown = Shutdown::new();
    let mut tasks = JoinSet::new();

    let entry_server = HttpServer::new(registry.clone(), &config.timeouts);
    tasks.spawn(entry_server.run(entry, shutdown.subscribe()));

    let admin_server = AdminServer::new(registry.clone(), client, &config.admin, &config.timeouts);
    tasks.spawn(admin_server.run(manage, shutdown.subscribe()));

    tracing::info!(
        entry = %entry_addr,
        manage = %manage_addr,
        rules = registry.len(),
        "Router started"
    );

    Ok(RunningRouter {
        entry_addr,
        manage_addr,
        registry,
        shutdown,
        tasks,
    })
}

async fn bind(addr: String) -> Result<TcpListener, StartupError> {
    TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })
}
