//! Upload pipeline: chunking, transmission, stream consumption and orchestration.

mod chunker;
mod orchestrator;
mod stream;
mod transmitter;
mod types;

pub use chunker::{Chunk, Chunker, Chunks};
pub use orchestrator::{PreparedUpload, UploadOrchestrator};
pub use stream::{drain_body, BodyReader, StreamDecoder};
pub use transmitter::{ChunkTransmitter, ChunkUpload};
pub use types::*;
