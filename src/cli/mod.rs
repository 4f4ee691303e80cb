//! Command-line entry point for the cass MCP server
//!
//! Parses flags, initializes logging, loads configuration, starts the
//! background indexer and serves HTTP/SSE (or stdio) until a shutdown
//! signal arrives. The indexer is always stopped before returning so no
//! watch child outlives the server.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::config::Config;
use crate::core::services::Services;
use crate::http::{self, AppState};
use crate::mcp::McpServer;

/// Default log filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "cass_mcp=info";

/// cass-mcp - MCP server for Coding Agent Session Search
///
/// Exposes the cass CLI as MCP tools over SSE and keeps the cass index
/// fresh in the background.
#[derive(Parser, Debug)]
#[command(name = "cass-mcp")]
#[command(version)]
#[command(about = "MCP server for Coding Agent Session Search", long_about = None)]
pub struct Cli {
    /// Listen address (overrides HOST and the config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT and the config file)
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to a TOML config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Serve MCP over stdin/stdout instead of HTTP/SSE
    #[arg(long)]
    pub stdio: bool,

    /// Do not start the background indexer
    #[arg(long)]
    pub no_indexer: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// Initialize tracing on stderr
///
/// stdout is reserved for protocol traffic in stdio mode.
pub fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load configuration, degrading to env-only defaults on error
pub fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load_from(Some(path)),
        None => Config::load(),
    };

    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {}", e);
        tracing::warn!("Continuing with defaults and environment overrides");
        Config::from_env()
    });

    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config
}

/// Run the server until shutdown
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.log_json);

    tracing::info!("Starting cass MCP server");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli);
    config.log_config();

    let services = Arc::new(Services::new(config));

    // Start in the background so requests are served during the initial pass
    let starter = if cli.no_indexer {
        tracing::info!("Background indexer disabled");
        None
    } else {
        let services = Arc::clone(&services);
        Some(tokio::spawn(async move { services.start_indexer().await }))
    };

    let served: Result<(), Box<dyn std::error::Error>> = if cli.stdio {
        let mut server = McpServer::new(Arc::clone(&services));
        server.run(shutdown_signal()).await.map_err(Into::into)
    } else {
        serve_http(Arc::clone(&services)).await
    };

    tracing::info!("Application shutting down...");
    if let Some(starter) = starter {
        starter.abort();
    }
    services.indexer.stop().await;

    served
}

async fn serve_http(services: Arc<Services>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", services.config.server.host, services.config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("SSE endpoint at http://{}/sse", addr);

    http::serve(listener, AppState::new(services), shutdown_signal()).await?;

    Ok(())
}

/// Future resolving on Ctrl+C or SIGTERM
///
/// The SIGTERM handler is installed when this is called, not when the
/// future is first polled, so a signal arriving in between is not lost
/// to the default action.
pub fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    #[cfg(unix)]
    let sigterm = {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(sigterm) => Some(sigterm),
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
                None
            }
        }
    };

    async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            match sigterm {
                Some(mut sigterm) => {
                    sigterm.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C"),
            _ = terminate => tracing::info!("Received SIGTERM"),
        }
    }
}
