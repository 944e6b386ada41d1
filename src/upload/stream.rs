//! Incremental consumption of streamed response bodies.
//!
//! Bytes arrive in arbitrary pieces, so a multi-byte UTF-8 sequence can be
//! split across two reads. `StreamDecoder` carries the incomplete tail over
//! to the next read instead of mangling it.

use crate::error::Result;
use async_trait::async_trait;

/// Stateful UTF-8 decoder. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `input` as possible, keeping an incomplete trailing sequence
    pub fn decode(&mut self, input: &[u8]) -> String {
        self.pending.extend_from_slice(input);
        let mut out = String::with_capacity(self.pending.len());

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));

                    match e.error_len() {
                        // Incomplete sequence at the end; wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + invalid_len);
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end-of-stream; a dangling partial sequence becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// A body that yields raw byte pieces until exhausted
#[async_trait]
pub trait BodyReader: Send {
    /// `None` signals end-of-stream
    async fn next_piece(&mut self) -> Result<Option<Vec<u8>>>;
}

#[async_trait]
impl BodyReader for reqwest::Response {
    async fn next_piece(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.chunk().await?.map(|bytes| bytes.to_vec()))
    }
}

/// Read, decode and accumulate until the body signals completion
pub async fn drain_body<R: BodyReader + ?Sized>(body: &mut R) -> Result<String> {
    let mut decoder = StreamDecoder::new();
    let mut accumulated = String::new();

    while let Some(piece) = body.next_piece().await? {
        accumulated.push_str(&decoder.decode(&piece));
    }
    accumulated.push_str(&decoder.finish());

    Ok(accumulated)
}
