//! cass MCP server
//!
//! Serves the cass tools over HTTP/SSE (default) or stdio.
//!
//! # Examples
//!
//! ```bash
//! # SSE on 0.0.0.0:8080
//! cass-mcp
//!
//! # Local only, no background indexer
//! cass-mcp --host 127.0.0.1 --port 9000 --no-indexer
//!
//! # stdio for a local MCP client
//! cass-mcp --stdio
//! ```

use cass_mcp::cli::{run, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
