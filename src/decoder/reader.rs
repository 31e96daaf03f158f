//! Tag-based frame scanner

use tracing::trace;

use crate::types::LengthClass;
use crate::{AgentError, Result};

/// One `(tag, value)` chunk read from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Byte offset of the tag within the frame
    pub offset: usize,
    /// Tag byte
    pub tag: u8,
    /// Value bytes following the tag, `LengthClass::value_len()` long
    pub value: &'a [u8],
}

/// Scans a frame into chunks, one length class at a time.
///
/// Chunks are only started while the cursor is below half of the buffer
/// length. A chunk started below that limit is still read in full. This
/// matches the devices in the field and must not be widened to the full
/// buffer; see DESIGN.md.
///
/// Yields `Err(FrameTruncated)` once if a chunk would overrun the buffer,
/// then stops.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    data: &'a [u8],
    cursor: usize,
    limit: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0, limit: data.len() / 2 }
    }

    /// Offset below which chunks are started.
    pub fn scan_limit(&self) -> usize {
        self.limit
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.limit {
            return None;
        }

        let offset = self.cursor;
        let tag = self.data[offset];
        let needed = LengthClass::of(tag).size();

        let Some(chunk) = self.data.get(offset..offset + needed) else {
            let available = self.data.len() - offset;
            self.cursor = self.limit;
            return Some(Err(AgentError::FrameTruncated { offset, tag, needed, available }));
        };

        trace!(offset, tag, len = needed, "frame chunk");
        self.cursor += needed;
        Some(Ok(Chunk { offset, tag, value: &chunk[1..] }))
    }
}
