//! Glue between file selection, the upload pipeline, the status poller and
//! the order listing.
//!
//! The controller is the only writer of [`ClientState`]. Background work
//! (the upload task, the poll loop) reports back through channels and every
//! report is checked against the active session before it touches state.
//! `UploadSession::chunks_sent` is counted by the orchestrator; the controller
//! only mirrors the count carried in each [`ChunkReceipt`].

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::OrderServiceClient;
use crate::config::ClientConfig;
use crate::error::{Result, UploaderError};
use crate::events::{ClientEventPayload, EventBus};
use crate::logging::{
    log_debug, log_error, log_info, log_warn, COMPONENT_CONTROLLER, COMPONENT_ORDERS,
};
use crate::orders::{Order, OrderSource, Pagination, ResultFetcher};
use crate::shutdown::ShutdownCoordinator;
use crate::status::{PollerHandle, ProcessingStatus, StatusPoller, StatusSource, StatusUpdate};
use crate::upload::{
    ChunkReceipt, ChunkTransmitter, SelectedFile, UploadOrchestrator, UploadOutcome,
    UploadSession,
};

#[derive(Debug, Clone, Default)]
pub struct ClientState {
    pub session: Option<UploadSession>,
    pub upload_finished: bool,
    pub upload_error: Option<String>,
    pub status: Option<ProcessingStatus>,
    pub pagination: Pagination,
    pub orders: Vec<Order>,
}

impl ClientState {
    pub fn is_processing_completed(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.is_completed())
    }
}

#[derive(Debug)]
pub enum ControllerMessage {
    ChunkSent(ChunkReceipt),
    UploadEnded {
        file_identifier: String,
        result: Result<UploadOutcome>,
    },
    Status(StatusUpdate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunUntil {
    UploadFinished,
    ProcessingCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    Settled,
    Interrupted,
}

pub struct Controller {
    items_per_page: u32,
    orchestrator: UploadOrchestrator,
    poller: StatusPoller,
    fetcher: ResultFetcher,
    events: EventBus,
    state: ClientState,
    poll_handle: Option<PollerHandle>,
    messages_tx: mpsc::UnboundedSender<ControllerMessage>,
    messages_rx: mpsc::UnboundedReceiver<ControllerMessage>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    status_rx: mpsc::UnboundedReceiver<StatusUpdate>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("items_per_page", &self.items_per_page)
            .field("state", &self.state)
            .field("polling", &self.poll_handle.as_ref().map(|h| h.file_identifier()))
            .finish()
    }
}

impl Controller {
    pub fn new(
        config: &ClientConfig,
        transmitter: Arc<dyn ChunkTransmitter>,
        status_source: Arc<dyn StatusSource>,
        order_source: Arc<dyn OrderSource>,
        events: EventBus,
    ) -> Self {
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        Self {
            items_per_page: config.items_per_page,
            orchestrator: UploadOrchestrator::new(transmitter, config),
            poller: StatusPoller::new(status_source, config.poll_interval()),
            fetcher: ResultFetcher::new(order_source),
            events,
            state: ClientState::default(),
            poll_handle: None,
            messages_tx,
            messages_rx,
            status_tx,
            status_rx,
        }
    }

    /// All three seams backed by the same HTTP client
    pub fn with_client(config: &ClientConfig, client: OrderServiceClient, events: EventBus) -> Self {
        let client = Arc::new(client);
        Self::new(config, client.clone(), client.clone(), client, events)
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn is_polling(&self) -> bool {
        self.poll_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn can_go_previous(&self) -> bool {
        self.state.pagination.can_go_previous()
    }

    pub fn can_go_next(&self) -> bool {
        self.state.pagination.can_go_next()
    }

    /// First render: no status yet, so the listing is considered fresh
    pub async fn initialize(&mut self) -> bool {
        self.refresh_orders(self.state.pagination.page).await
    }

    /// Start a new upload, replacing whatever session was active.
    ///
    /// Validation failures return early without touching state or the network.
    pub async fn select_file(&mut self, file: SelectedFile) -> Result<String> {
        let prepared = self.orchestrator.prepare(file)?;
        let session = prepared.session.clone();
        let file_identifier = session.file_identifier.clone();

        // Old session out, status cleared, before the new poller exists
        self.stop_polling();
        if let Some(previous) = self.state.session.take() {
            log_info(
                COMPONENT_CONTROLLER,
                &format!("Discarding session {}", previous.file_identifier),
            )
            .unwrap_or_default();
        }
        self.state.session = Some(session.clone());
        self.state.status = None;
        self.state.upload_finished = false;
        self.state.upload_error = None;
        self.state.pagination = Pagination::default();
        self.fetcher.reset();

        self.events.publish(ClientEventPayload::UploadStarted {
            file_identifier: file_identifier.clone(),
            file_name: session.original_name.clone(),
            file_size: session.file_size,
            total_chunks: session.total_chunks,
        });

        let orchestrator = self.orchestrator.clone();
        let messages_tx = self.messages_tx.clone();
        let task_identifier = file_identifier.clone();
        tokio::spawn(async move {
            let progress_tx = messages_tx.clone();
            let result = orchestrator
                .run(prepared, move |receipt| {
                    let _ = progress_tx.send(ControllerMessage::ChunkSent(receipt));
                })
                .await;
            let _ = messages_tx.send(ControllerMessage::UploadEnded {
                file_identifier: task_identifier,
                result,
            });
        });

        // Nothing reaches the server for an empty file, so there is nothing to track
        if session.total_chunks > 0 {
            self.poll_handle = Some(
                self.poller
                    .start(file_identifier.clone(), self.status_tx.clone()),
            );
        }

        // Status just became absent
        self.refresh_orders(1).await;

        Ok(file_identifier)
    }

    /// Wait for the next report from the upload task or the poller
    pub async fn next_message(&mut self) -> Option<ControllerMessage> {
        tokio::select! {
            Some(message) = self.messages_rx.recv() => Some(message),
            Some(update) = self.status_rx.recv() => Some(ControllerMessage::Status(update)),
            else => None,
        }
    }

    pub async fn handle_message(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::ChunkSent(receipt) => self.apply_chunk_receipt(receipt),
            ControllerMessage::UploadEnded {
                file_identifier,
                result,
            } => self.apply_upload_result(file_identifier, result),
            ControllerMessage::Status(update) => {
                self.apply_status(update).await;
            }
        }
    }

    fn is_active_session(&self, file_identifier: &str) -> bool {
        self.state
            .session
            .as_ref()
            .is_some_and(|s| s.file_identifier == file_identifier)
    }

    fn apply_chunk_receipt(&mut self, receipt: ChunkReceipt) {
        if !self.is_active_session(&receipt.file_identifier) {
            return;
        }

        if let Some(session) = self.state.session.as_mut() {
            session.chunks_sent = receipt.chunks_sent;
        }

        self.events.publish(ClientEventPayload::ChunkSent {
            file_identifier: receipt.file_identifier,
            chunk_index: receipt.chunk_index,
            total_chunks: receipt.total_chunks,
        });
    }

    fn apply_upload_result(&mut self, file_identifier: String, result: Result<UploadOutcome>) {
        if !self.is_active_session(&file_identifier) {
            let replaced = UploaderError::SessionReplaced(file_identifier);
            log_debug(
                COMPONENT_CONTROLLER,
                &format!("Ignoring upload result: {}", replaced),
            )
            .unwrap_or_default();
            return;
        }

        self.state.upload_finished = true;

        match result {
            Ok(UploadOutcome::Completed { chunks_sent, .. }) => {
                self.events.publish(ClientEventPayload::UploadFinished {
                    file_identifier,
                    chunks_sent,
                });
            }
            Ok(UploadOutcome::Aborted {
                failed_chunk,
                error,
                ..
            }) => {
                self.state.upload_error = Some(error.to_string());
                self.events.publish(ClientEventPayload::UploadAborted {
                    file_identifier,
                    failed_chunk,
                    reason: error.to_string(),
                });
            }
            Err(error) => {
                log_error(
                    COMPONENT_CONTROLLER,
                    &format!("Upload of {} failed before sending: {}", file_identifier, error),
                )
                .unwrap_or_default();
                self.state.upload_error = Some(error.to_string());
                self.events.publish(ClientEventPayload::UploadAborted {
                    file_identifier,
                    failed_chunk: 0,
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Replace the held status. Returns true if this triggered an order re-fetch.
    pub async fn apply_status(&mut self, update: StatusUpdate) -> bool {
        if !self.is_active_session(&update.file_identifier) {
            let replaced = UploaderError::SessionReplaced(update.file_identifier);
            log_debug(
                COMPONENT_CONTROLLER,
                &format!("Dropping late status: {}", replaced),
            )
            .unwrap_or_default();
            return false;
        }

        let was_completed = self.state.is_processing_completed();
        let now_completed = update.status.is_completed();

        if now_completed && !update.status.counts_consistent() {
            log_warn(
                COMPONENT_CONTROLLER,
                &format!(
                    "Order counts for {} exceed total ({} total)",
                    update.file_identifier, update.status.total_orders
                ),
            )
            .unwrap_or_default();
        }

        self.state.status = Some(update.status.clone());
        self.events.publish(ClientEventPayload::StatusUpdated {
            file_identifier: update.file_identifier,
            status: update.status,
        });

        if now_completed && !was_completed {
            // Poller has already stopped itself; release the handle
            self.poll_handle = None;
            self.refresh_orders(self.state.pagination.page).await;
            return true;
        }

        false
    }

    /// Move to `page`. Out-of-range pages are rejected without a request.
    pub async fn change_page(&mut self, page: u32) -> Result<()> {
        if !self.state.pagination.contains(page) {
            return Err(UploaderError::InvalidPage {
                page,
                total_pages: self.state.pagination.total_pages,
            });
        }
        if page == self.state.pagination.page {
            return Ok(());
        }

        self.refresh_orders(page).await;
        Ok(())
    }

    pub async fn next_page(&mut self) -> Result<()> {
        self.change_page(self.state.pagination.page.saturating_add(1))
            .await
    }

    pub async fn previous_page(&mut self) -> Result<()> {
        self.change_page(self.state.pagination.page.saturating_sub(1))
            .await
    }

    /// Fetch `page`; on failure the previous page stays in place
    async fn refresh_orders(&mut self, page: u32) -> bool {
        match self.fetcher.fetch_page(page, self.items_per_page).await {
            Ok(result) => {
                self.state.pagination = Pagination {
                    page: result.page.max(1),
                    total_pages: result.total_pages.max(1),
                };
                self.events.publish(ClientEventPayload::OrdersFetched {
                    page: self.state.pagination.page,
                    total_pages: self.state.pagination.total_pages,
                    count: result.orders.len(),
                });
                self.state.orders = result.orders;
                true
            }
            Err(error) => {
                log_error(
                    COMPONENT_ORDERS,
                    &format!("Error fetching orders (page {}): {}", page, error),
                )
                .unwrap_or_default();
                self.events.publish(ClientEventPayload::FetchFailed {
                    page,
                    reason: error.to_string(),
                });
                false
            }
        }
    }

    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            handle.cancel();
        }
    }

    fn is_settled(&self, until: RunUntil) -> bool {
        if self.state.session.is_none() {
            return true;
        }

        match until {
            RunUntil::UploadFinished => self.state.upload_finished,
            RunUntil::ProcessingCompleted => {
                self.state.is_processing_completed()
                    || (self.state.upload_finished
                        && (self.state.upload_error.is_some() || self.poll_handle.is_none()))
            }
        }
    }

    /// Drive messages until `until` holds or shutdown is requested
    pub async fn run(&mut self, until: RunUntil, shutdown: &ShutdownCoordinator) -> RunExit {
        let mut shutdown_rx = shutdown.subscribe();

        loop {
            if shutdown.is_shutdown() {
                self.stop_polling();
                return RunExit::Interrupted;
            }
            if self.is_settled(until) {
                return RunExit::Settled;
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    self.stop_polling();
                    return RunExit::Interrupted;
                }
                message = self.next_message() => match message {
                    Some(message) => self.handle_message(message).await,
                    None => return RunExit::Settled,
                }
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
