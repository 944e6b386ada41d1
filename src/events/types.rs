use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::ProcessingStatus;

/// Sequence number for ordering events
pub type EventSequence = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientEvent {
    pub sequence: EventSequence,
    pub timestamp: DateTime<Utc>,
    pub payload: ClientEventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEventPayload {
    /// New session created; previous status and page were discarded
    UploadStarted {
        file_identifier: String,
        file_name: String,
        file_size: u64,
        total_chunks: u32,
    },

    /// A chunk's response stream was fully drained
    ChunkSent {
        file_identifier: String,
        chunk_index: u32,
        total_chunks: u32,
    },

    UploadFinished {
        file_identifier: String,
        chunks_sent: u32,
    },

    /// Stopped at the first failed chunk
    UploadAborted {
        file_identifier: String,
        failed_chunk: u32,
        reason: String,
    },

    StatusUpdated {
        file_identifier: String,
        status: ProcessingStatus,
    },

    OrdersFetched {
        page: u32,
        total_pages: u32,
        count: usize,
    },

    /// Listing failed; the previous page is still shown
    FetchFailed {
        page: u32,
        reason: String,
    },
}

impl ClientEvent {
    pub fn file_identifier(&self) -> Option<&str> {
        match &self.payload {
            ClientEventPayload::UploadStarted { file_identifier, .. }
            | ClientEventPayload::ChunkSent { file_identifier, .. }
            | ClientEventPayload::UploadFinished { file_identifier, .. }
            | ClientEventPayload::UploadAborted { file_identifier, .. }
            | ClientEventPayload::StatusUpdated { file_identifier, .. } => Some(file_identifier),
            ClientEventPayload::OrdersFetched { .. } | ClientEventPayload::FetchFailed { .. } => {
                None
            }
        }
    }

    pub fn payload_type(&self) -> &str {
        match &self.payload {
            ClientEventPayload::UploadStarted { .. } => "upload_started",
            ClientEventPayload::ChunkSent { .. } => "chunk_sent",
            ClientEventPayload::UploadFinished { .. } => "upload_finished",
            ClientEventPayload::UploadAborted { .. } => "upload_aborted",
            ClientEventPayload::StatusUpdated { .. } => "status_updated",
            ClientEventPayload::OrdersFetched { .. } => "orders_fetched",
            ClientEventPayload::FetchFailed { .. } => "fetch_failed",
        }
    }
}
