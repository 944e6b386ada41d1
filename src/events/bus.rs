use super::types::{ClientEvent, ClientEventPayload, EventSequence};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

pub type EventReceiver = broadcast::Receiver<ClientEvent>;
pub type EventSender = broadcast::Sender<ClientEvent>;

/// Fan-out of controller events to observers (CLI rendering, tests)
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: EventSender,
    sequence: Arc<AtomicU64>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Publish an event and return its sequence number.
    ///
    /// Having no subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, payload: ClientEventPayload) -> EventSequence {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);

        let event = ClientEvent {
            sequence,
            timestamp: Utc::now(),
            payload,
        };

        let _ = self.sender.send(event);
        sequence
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn current_sequence(&self) -> EventSequence {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
