//! Unified service container for the cass MCP server
//!
//! Provides shared access to all core services.

use crate::core::binary::resolve_binary;
use crate::core::config::Config;
use crate::core::runner::CassRunner;
use crate::core::supervisor::{BackgroundIndexer, SupervisorSettings};
use std::sync::Arc;

/// Unified services container
///
/// Built once at startup and handed to every adapter; nothing in the
/// crate reaches for a global instance.
#[derive(Clone)]
pub struct Services {
    /// Runs the cass binary for tool calls
    pub runner: CassRunner,

    /// Background indexer
    pub indexer: Arc<BackgroundIndexer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration
    ///
    /// The binary is resolved here; if it cannot be found the fallback
    /// path is used and invocations fail until it appears.
    pub fn new(config: Config) -> Self {
        let binary = resolve_binary(config.cass.binary.as_deref());
        let runner = CassRunner::new(binary, config.cass.data_dir.clone());
        let indexer = Arc::new(BackgroundIndexer::new(
            runner.clone(),
            SupervisorSettings::from(&config),
        ));

        Self {
            runner,
            indexer,
            config: Arc::new(config),
        }
    }

    /// Start the background indexer using the configured modes
    pub async fn start_indexer(&self) {
        self.indexer
            .start(
                self.config.indexer.enable_watch,
                self.config.indexer.index_on_start,
            )
            .await;
    }
}
