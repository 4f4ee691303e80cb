//! MCP tool implementations
//!
//! Each tool maps its arguments onto one cass subcommand and returns
//! the normalized invocation result as a single text block.

pub mod capabilities;
pub mod context;
pub mod expand;
pub mod export;
pub mod handler;
pub mod health;
pub mod helpers;
pub mod index;
pub mod registry;
pub mod search;
pub mod stats;
pub mod timeline;
pub mod view;

pub use capabilities::CapabilitiesHandler;
pub use context::ContextHandler;
pub use expand::ExpandHandler;
pub use export::ExportHandler;
pub use handler::{error_content, invocation_content, text_content, McpToolHandler};
pub use health::HealthHandler;
pub use index::IndexHandler;
pub use registry::ToolRegistry;
pub use search::SearchHandler;
pub use stats::StatsHandler;
pub use timeline::TimelineHandler;
pub use view::ViewHandler;

use crate::core::services::Services;
use std::sync::Arc;

/// Names of every tool, in advertised order
pub const TOOL_NAMES: &[&str] = &[
    "cass_search",
    "cass_stats",
    "cass_capabilities",
    "cass_timeline",
    "cass_context",
    "cass_view",
    "cass_expand",
    "cass_export",
    "cass_health",
    "cass_index",
];

/// Build a registry holding all cass tools
pub fn build_registry(services: Arc<Services>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(StatsHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(CapabilitiesHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(TimelineHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(ContextHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(ViewHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(ExpandHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(ExportHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(HealthHandler::new(Arc::clone(&services))));
    registry.register(Arc::new(IndexHandler::new(services)));
    registry
}
