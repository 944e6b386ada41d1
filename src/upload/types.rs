//! Type definitions for the upload pipeline.
//!
//! Defines the selected file, the per-upload session and the outcome types
//! reported back to the controller.

use crate::error::{Result, UploaderError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique server-facing key: random token plus the original file name
pub fn generate_file_identifier(original_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), original_name)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSession {
    pub file_identifier: String,
    pub original_name: String,
    pub total_chunks: u32,
    pub chunks_sent: u32,
    pub file_size: u64,
    pub started_at: DateTime<Utc>,
}

impl UploadSession {
    pub fn new(original_name: &str, file_size: u64, total_chunks: u32) -> Self {
        Self {
            file_identifier: generate_file_identifier(original_name),
            original_name: original_name.to_string(),
            total_chunks,
            chunks_sent: 0,
            file_size,
            started_at: Utc::now(),
        }
    }

    pub fn is_fully_sent(&self) -> bool {
        self.chunks_sent >= self.total_chunks
    }
}

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file picked by the user. Only name and size are known until the upload runs.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl SelectedFile {
    /// Reads metadata only; contents are loaded once validation has passed
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            UploaderError::Validation(format!(
                "Failed to get file metadata for '{}': {}",
                path.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(UploaderError::Validation(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                UploaderError::Validation(format!("Invalid file name: {}", path.display()))
            })?
            .to_string();

        Ok(Self {
            name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        let bytes = match self.source {
            FileSource::Memory(bytes) => bytes,
            FileSource::Path(path) => tokio::fs::read(&path).await?,
        };

        // File changed between selection and upload
        if bytes.len() as u64 != self.size {
            return Err(UploaderError::Other(format!(
                "File '{}' changed size since selection ({} -> {} bytes)",
                self.name,
                self.size,
                bytes.len()
            )));
        }

        Ok(bytes)
    }
}

/// Emitted after each chunk's response stream has been fully drained
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkReceipt {
    pub file_identifier: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    /// Chunks accepted so far in this upload, this one included
    pub chunks_sent: u32,
    pub response: String,
}

#[derive(Debug)]
pub enum UploadOutcome {
    Completed {
        file_identifier: String,
        chunks_sent: u32,
    },
    /// Stopped at the first failed chunk; later chunks were never sent
    Aborted {
        file_identifier: String,
        chunks_sent: u32,
        failed_chunk: u32,
        error: UploaderError,
    },
}

impl UploadOutcome {
    pub fn file_identifier(&self) -> &str {
        match self {
            UploadOutcome::Completed { file_identifier, .. } => file_identifier,
            UploadOutcome::Aborted { file_identifier, .. } => file_identifier,
        }
    }

    pub fn chunks_sent(&self) -> u32 {
        match self {
            UploadOutcome::Completed { chunks_sent, .. } => *chunks_sent,
            UploadOutcome::Aborted { chunks_sent, .. } => *chunks_sent,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, UploadOutcome::Completed { .. })
    }
}
