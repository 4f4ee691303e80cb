//! MCP server over stdio

use crate::core::services::Services;
use crate::mcp::error::McpError;
use crate::mcp::handlers::ProtocolHandlers;
use crate::mcp::transport::StdioTransport;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

/// Line-delimited JSON-RPC server on stdin/stdout
pub struct McpServer {
    transport: StdioTransport,
    handlers: Arc<ProtocolHandlers>,
}

impl McpServer {
    pub fn new(services: Arc<Services>) -> Self {
        Self::with_transport(services, StdioTransport::new())
    }

    pub fn with_transport(services: Arc<Services>, transport: StdioTransport) -> Self {
        Self {
            transport,
            handlers: Arc::new(ProtocolHandlers::new(services)),
        }
    }

    /// Serve stdin until it closes or `shutdown` resolves
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), McpError>
    where
        F: Future<Output = ()>,
    {
        info!("Starting cass MCP server on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), shutdown)
            .await
    }

    /// Serve requests read line by line from `reader`
    ///
    /// Returns at EOF or as soon as `shutdown` resolves, even while a
    /// client keeps the input open.
    pub async fn serve<R, F>(&mut self, reader: R, shutdown: F) -> Result<(), McpError>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = reader.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) if !line.trim().is_empty() => {
                            let response = self.handlers.handle_message(&line).await;
                            self.transport.send_response(response).await?;
                        }
                        None => break,
                        _ => continue,
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested, leaving stdio loop");
                    break;
                }
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }
}
