//! Line-delimited JSON-RPC transport for the stdio server

use crate::mcp::error::McpError;
use crate::mcp::protocol::JsonRpcResponse;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::debug;

type Output = Box<dyn AsyncWrite + Send + Unpin>;

/// Writes one JSON response per line
pub struct StdioTransport {
    out: BufWriter<Output>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::with_writer(tokio::io::stdout())
    }

    /// Write responses to `writer` instead of stdout
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            out: BufWriter::new(Box::new(writer)),
        }
    }

    /// Write a response, skipping notifications
    pub async fn send_response(&mut self, response: JsonRpcResponse) -> Result<(), McpError> {
        if response.is_empty() {
            return Ok(());
        }

        let json = serde_json::to_string(&response)?;
        debug!("Sending: {}", json);

        self.out.write_all(json.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
