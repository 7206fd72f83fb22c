//! Chunk planning.

use std::ops::Range;

/// Ordered, contiguous, non-overlapping byte ranges covering a payload
/// exactly once.
///
/// The chunk count is `min(fan_out, payload_len)`, so no chunk is empty
/// unless the payload is. An empty payload gets one empty chunk. Every chunk
/// has `payload_len / count` bytes except the last, which also absorbs the
/// remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    ranges: Vec<Range<usize>>,
    payload_len: usize,
}

impl ChunkPlan {
    /// Plan `payload_len` bytes into at most `fan_out` chunks. A zero
    /// `fan_out` is treated as one.
    pub fn new(payload_len: usize, fan_out: usize) -> Self {
        let count = fan_out.min(payload_len).max(1);
        let base = payload_len / count;

        let ranges = (0..count)
            .map(|i| {
                let start = i * base;
                let end = if i + 1 == count {
                    payload_len
                } else {
                    start + base
                };
                start..end
            })
            .collect();

        Self {
            ranges,
            payload_len,
        }
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of chunks (always at least one).
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Borrow each chunk of `payload`, in order.
    ///
    /// `payload` must be the payload this plan was made for.
    pub fn slices<'a>(&self, payload: &'a [u8]) -> Vec<&'a [u8]> {
        debug_assert_eq!(payload.len(), self.payload_len);
        self.ranges.iter().map(|r| &payload[r.clone()]).collect()
    }
}
