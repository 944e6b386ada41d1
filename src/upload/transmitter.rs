//! The seam between the orchestrator and the wire.

use crate::error::Result;
use async_trait::async_trait;

/// One chunk plus the metadata the server needs to reassemble the file
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkUpload {
    pub bytes: Vec<u8>,
    pub file_identifier: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub is_last: bool,
}

/// Sends a single chunk and returns the fully drained response text.
///
/// Implementations must not return before the response stream has signalled
/// end-of-stream; the orchestrator relies on that for ordering.
#[async_trait]
pub trait ChunkTransmitter: Send + Sync {
    async fn send(&self, chunk: ChunkUpload) -> Result<String>;
}
