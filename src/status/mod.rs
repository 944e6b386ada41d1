//! Processing-status model and the poller that tracks it.

mod poller;
mod types;

pub use poller::{PollSummary, PollerHandle, StatusPoller, StatusUpdate};
pub use types::{OrderProcessingStatus, ProcessingStatus};

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can answer "how far along is this file?"
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn processing_status(&self, file_identifier: &str) -> Result<ProcessingStatus>;
}
