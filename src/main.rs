//! Host/path reverse-proxy router.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     HOST ROUTER                      │
//!   Client Request   │  ┌──────────┐    ┌────────────┐    ┌──────────────┐  │
//!   ─────────────────┼─▶│  entry   │───▶│ dispatcher │───▶│ reverse proxy│──┼──▶ Backend
//!                    │  │ listener │    └─────┬──────┘    └──────────────┘  │
//!                    │  └──────────┘          │ read                        │
//!                    │                  ┌─────▼──────┐    ┌──────────────┐  │
//!                    │                  │  registry  │───▶│  rule store  │  │
//!                    │                  └─────▲──────┘    │ (JSON file)  │  │
//!                    │  ┌──────────┐          │ write     └──────────────┘  │
//!   Management UI ───┼─▶│  manage  │──────────┘                             │
//!                    │  │ listener │                                        │
//!                    │  └──────────┘                                        │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use host_router::config::{check_config, load_config, RouterConfig};
use host_router::lifecycle;
use host_router::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "host-router")]
#[command(about = "Host/path based reverse-proxy router", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entry serve port.
    #[arg(long)]
    main_port: Option<u16>,

    /// Manager serve port.
    #[arg(long)]
    manage_port: Option<u16>,

    /// Address both listeners bind to.
    #[arg(long)]
    bind: Option<String>,

    /// JSON rule document.
    #[arg(long)]
    rules: Option<String>,

    /// Directory served as the management UI.
    #[arg(long)]
    static_dir: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut RouterConfig) {
        if let Some(port) = self.main_port {
            config.listener.main_port = port;
        }
        if let Some(port) = self.manage_port {
            config.listener.manage_port = port;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(rules) = self.rules {
            config.storage.rules_path = rules;
        }
        if let Some(dir) = self.static_dir {
            config.admin.static_dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    let mut config = match cli.config.take() {
        Some(path) => load_config(&path)?,
        None => RouterConfig::default(),
    };
    cli.apply(&mut config);

    init_logging(&config.observability.log_level);
    tracing::info!("host-router v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = check_config(&config) {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    tracing::info!(
        main_port = config.listener.main_port,
        manage_port = config.listener.manage_port,
        rules_path = %config.storage.rules_path,
        "Configuration loaded"
    );

    let router = match lifecycle::start(&config).await {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    router.run_until_signal().await?;
    Ok(())
}
