mod bus;
mod types;

pub use bus::{EventBus, EventReceiver};
pub use types::{ClientEvent, ClientEventPayload, EventSequence};
