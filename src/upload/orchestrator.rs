//! Drives a whole file through the transmitter, one chunk at a time.
//!
//! Chunk N+1 is only issued after chunk N's request/response cycle, stream
//! drain included, has resolved. The first failure ends the upload.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::logging::{log_error, log_info, log_with_details, COMPONENT_UPLOAD};
use crate::validation::validate_upload_file;

use super::chunker::Chunker;
use super::transmitter::{ChunkTransmitter, ChunkUpload};
use super::types::{ChunkReceipt, SelectedFile, UploadOutcome, UploadSession};

/// A validated file with its session allocated; nothing has been sent yet
#[derive(Debug)]
pub struct PreparedUpload {
    pub session: UploadSession,
    file: SelectedFile,
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    transmitter: Arc<dyn ChunkTransmitter>,
    chunk_size: u64,
    accepted_extension: String,
    max_file_size: u64,
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("transmitter", &"<transmitter>")
            .field("chunk_size", &self.chunk_size)
            .field("accepted_extension", &self.accepted_extension)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl UploadOrchestrator {
    pub fn new(transmitter: Arc<dyn ChunkTransmitter>, config: &ClientConfig) -> Self {
        Self {
            transmitter,
            chunk_size: config.chunk_size_bytes,
            accepted_extension: config.accepted_extension.clone(),
            max_file_size: config.max_file_size_bytes,
        }
    }

    /// Validate and allocate a session. No I/O beyond what `file` already did.
    pub fn prepare(&self, file: SelectedFile) -> Result<PreparedUpload> {
        validate_upload_file(
            file.name(),
            file.size(),
            &self.accepted_extension,
            self.max_file_size,
        )?;

        let chunker = Chunker::new(file.size(), self.chunk_size);
        let session = UploadSession::new(file.name(), file.size(), chunker.total_chunks());

        Ok(PreparedUpload { session, file })
    }

    /// Send every chunk in index order. `on_chunk` sees each drained response.
    pub async fn run<F>(&self, prepared: PreparedUpload, mut on_chunk: F) -> Result<UploadOutcome>
    where
        F: FnMut(ChunkReceipt) + Send,
    {
        let PreparedUpload { session, file } = prepared;
        let file_identifier = session.file_identifier.clone();
        let total_chunks = session.total_chunks;

        if total_chunks == 0 {
            log_info(
                COMPONENT_UPLOAD,
                &format!("Empty file {}, nothing to upload", session.original_name),
            )
            .unwrap_or_default();
            return Ok(UploadOutcome::Completed {
                file_identifier,
                chunks_sent: 0,
            });
        }

        let bytes = file.into_bytes().await?;
        let chunker = Chunker::new(bytes.len() as u64, self.chunk_size);

        log_info(
            COMPONENT_UPLOAD,
            &format!(
                "📤 Uploading {} as {} ({} bytes, {} chunks)",
                session.original_name, file_identifier, session.file_size, total_chunks
            ),
        )
        .unwrap_or_default();

        let mut uploaded_chunks = 0;

        for chunk in &chunker {
            let request = ChunkUpload {
                bytes: bytes[chunk.byte_range()].to_vec(),
                file_identifier: file_identifier.clone(),
                chunk_index: chunk.index,
                total_chunks,
                is_last: chunk.is_last,
            };

            match self.transmitter.send(request).await {
                Ok(response) => {
                    uploaded_chunks += 1;
                    log_with_details(
                        COMPONENT_UPLOAD,
                        "DEBUG",
                        &format!(
                            "Chunk {}/{} of {} accepted",
                            chunk.index + 1,
                            total_chunks,
                            file_identifier
                        ),
                        serde_json::json!({ "response": response }),
                    )
                    .unwrap_or_default();

                    on_chunk(ChunkReceipt {
                        file_identifier: file_identifier.clone(),
                        chunk_index: chunk.index,
                        total_chunks,
                        chunks_sent: uploaded_chunks,
                        response,
                    });
                }
                Err(error) => {
                    log_error(
                        COMPONENT_UPLOAD,
                        &format!(
                            "✗ Failed to upload chunk {}/{} of {}, aborting: {}",
                            chunk.index + 1,
                            total_chunks,
                            file_identifier,
                            error
                        ),
                    )
                    .unwrap_or_default();

                    return Ok(UploadOutcome::Aborted {
                        file_identifier,
                        chunks_sent: uploaded_chunks,
                        failed_chunk: chunk.index,
                        error,
                    });
                }
            }
        }

        log_info(
            COMPONENT_UPLOAD,
            &format!("✓ Upload complete: {} ({} chunks)", file_identifier, uploaded_chunks),
        )
        .unwrap_or_default();

        Ok(UploadOutcome::Completed {
            file_identifier,
            chunks_sent: uploaded_chunks,
        })
    }

    /// Validate, then run to the end; progress is only visible through logs
    pub async fn upload(&self, file: SelectedFile) -> Result<UploadOutcome> {
        let prepared = self.prepare(file)?;
        self.run(prepared, |_| {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploaderError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const MIB: usize = 1024 * 1024;

    /// Records start/end of every send so interleaving would be visible
    #[derive(Default)]
    struct RecordingTransmitter {
        log: Mutex<Vec<String>>,
        received: Mutex<Vec<ChunkUpload>>,
        fail_at: Option<u32>,
    }

    impl RecordingTransmitter {
        fn failing_at(index: u32) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ChunkTransmitter for RecordingTransmitter {
        async fn send(&self, chunk: ChunkUpload) -> Result<String> {
            self.log
                .lock()
                .unwrap()
                .push(format!("start {}", chunk.chunk_index));
            // Simulate a multi-read response stream
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            let index = chunk.chunk_index;
            self.received.lock().unwrap().push(chunk);

            if self.fail_at == Some(index) {
                self.log.lock().unwrap().push(format!("fail {}", index));
                return Err(UploaderError::Server {
                    status: 500,
                    body: "disk full".to_string(),
                });
            }

            self.log.lock().unwrap().push(format!("end {}", index));
            Ok(format!("{{\"chunk\":{}}}", index))
        }
    }

    fn config_with_chunk_size(chunk_size: u64) -> ClientConfig {
        ClientConfig {
            chunk_size_bytes: chunk_size,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_prepare_rejects_wrong_extension() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let orchestrator = UploadOrchestrator::new(transmitter.clone(), &ClientConfig::default());

        let err = orchestrator
            .prepare(SelectedFile::from_bytes("data.txt", vec![1, 2, 3]))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(transmitter.received.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prepare_size_boundary() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let orchestrator = UploadOrchestrator::new(transmitter, &ClientConfig::default());

        let too_big = SelectedFile::from_bytes("orders.csv", vec![0; 10 * MIB + 1]);
        assert!(orchestrator.prepare(too_big).unwrap_err().is_validation());

        let at_limit = SelectedFile::from_bytes("orders.csv", vec![0; 10 * MIB]);
        let prepared = orchestrator.prepare(at_limit).unwrap();
        assert_eq!(prepared.session.total_chunks, 10);
    }

    #[tokio::test]
    async fn test_chunks_sent_strictly_in_order() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let orchestrator =
            UploadOrchestrator::new(transmitter.clone(), &config_with_chunk_size(4));

        let data: Vec<u8> = (0u8..18).collect();
        let mut receipts = Vec::new();
        let prepared = orchestrator
            .prepare(SelectedFile::from_bytes("orders.csv", data.clone()))
            .unwrap();
        let outcome = orchestrator
            .run(prepared, |receipt| {
                receipts.push((receipt.chunk_index, receipt.chunks_sent))
            })
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.chunks_sent(), 5);
        assert_eq!(receipts, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);

        let log = transmitter.log.lock().unwrap().clone();
        let expected: Vec<String> = (0..5)
            .flat_map(|i| vec![format!("start {}", i), format!("end {}", i)])
            .collect();
        assert_eq!(log, expected);

        let received = transmitter.received.lock().unwrap();
        let reassembled: Vec<u8> = received.iter().flat_map(|c| c.bytes.clone()).collect();
        assert_eq!(reassembled, data);
        assert!(received.iter().all(|c| c.total_chunks == 5));
        assert_eq!(
            received.iter().filter(|c| c.is_last).map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![4]
        );
        let identifier = &received[0].file_identifier;
        assert!(identifier.ends_with("_orders.csv"));
        assert!(received.iter().all(|c| &c.file_identifier == identifier));
    }

    #[tokio::test]
    async fn test_abort_on_first_failure() {
        let transmitter = Arc::new(RecordingTransmitter::failing_at(1));
        let orchestrator =
            UploadOrchestrator::new(transmitter.clone(), &config_with_chunk_size(10));

        let outcome = orchestrator
            .upload(SelectedFile::from_bytes("orders.csv", vec![7; 45]))
            .await
            .unwrap();

        match outcome {
            UploadOutcome::Aborted {
                chunks_sent,
                failed_chunk,
                error,
                ..
            } => {
                assert_eq!(chunks_sent, 1);
                assert_eq!(failed_chunk, 1);
                assert!(error.is_transmission());
            }
            other => panic!("expected abort, got {:?}", other),
        }

        let indices: Vec<u32> = transmitter
            .received
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.chunk_index)
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_empty_file_is_noop() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let orchestrator = UploadOrchestrator::new(transmitter.clone(), &ClientConfig::default());

        let outcome = orchestrator
            .upload(SelectedFile::from_bytes("empty.csv", Vec::new()))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.chunks_sent(), 0);
        assert!(transmitter.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_two_and_a_half_mib() {
        let transmitter = Arc::new(RecordingTransmitter::default());
        let orchestrator = UploadOrchestrator::new(transmitter.clone(), &ClientConfig::default());

        orchestrator
            .upload(SelectedFile::from_bytes("orders.csv", vec![b'x'; 2 * MIB + MIB / 2]))
            .await
            .unwrap();

        let received = transmitter.received.lock().unwrap();
        assert_eq!(received.len(), 3);
        let flags: Vec<bool> = received.iter().map(|c| c.is_last).collect();
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(received[2].bytes.len(), MIB / 2);
    }
}
