//! Deterministic partitioning of a byte length into ordered chunks.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    pub start: u64,
    pub end: u64,
    pub is_last: bool,
}

impl Chunk {
    pub fn byte_range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Splits `[0, total_len)` into `ceil(total_len / chunk_size)` chunks.
///
/// Iterating borrows nothing but two integers, so the sequence can be
/// restarted from the beginning any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    total_len: u64,
    chunk_size: u64,
}

impl Chunker {
    /// A zero chunk size is clamped to one byte.
    pub fn new(total_len: u64, chunk_size: u64) -> Self {
        Self {
            total_len,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn total_chunks(&self) -> u32 {
        let count = self.total_len.div_ceil(self.chunk_size);
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn iter(&self) -> Chunks {
        Chunks {
            chunker: *self,
            next_index: 0,
            total: self.total_chunks(),
        }
    }
}

impl IntoIterator for &Chunker {
    type Item = Chunk;
    type IntoIter = Chunks;

    fn into_iter(self) -> Chunks {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Chunks {
    chunker: Chunker,
    next_index: u32,
    total: u32,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.next_index >= self.total {
            return None;
        }

        let index = self.next_index;
        let start = u64::from(index) * self.chunker.chunk_size;
        let end = (start + self.chunker.chunk_size).min(self.chunker.total_len);
        self.next_index += 1;

        Some(Chunk {
            index,
            start,
            end,
            is_last: index + 1 == self.total,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}
