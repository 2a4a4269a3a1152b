//! Bounded capture of a byte stream
//!
//! Only the tail of a stream is kept. TeX prints the error, and the line it
//! happened on, at the end of its output.

use std::collections::VecDeque;
use std::fmt;

/// Holds the last `capacity` bytes written to it.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    tail: VecDeque<u8>,
    capacity: usize,
    seen: usize,
}

impl RingBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            tail: VecDeque::with_capacity(capacity.min(8 * 1024)),
            capacity,
            seen: 0,
        }
    }

    /// Append `chunk`, evicting the oldest bytes beyond capacity.
    pub fn write(&mut self, chunk: &[u8]) {
        self.seen += chunk.len();
        let keep = &chunk[chunk.len().saturating_sub(self.capacity)..];

        let excess = (self.tail.len() + keep.len()).saturating_sub(self.capacity);
        self.tail.drain(..excess);
        self.tail.extend(keep);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }

    /// Bytes written over the buffer's lifetime, evicted ones included.
    #[must_use]
    pub const fn total_bytes_written(&self) -> usize {
        self.seen
    }

    #[must_use]
    pub const fn was_truncated(&self) -> bool {
        self.seen > self.capacity
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        Vec::from(self.tail)
    }
}

impl fmt::Display for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (front, back) = self.tail.as_slices();
        let mut joined = Vec::with_capacity(self.tail.len());
        joined.extend_from_slice(front);
        joined.extend_from_slice(back);
        f.write_str(&String::from_utf8_lossy(&joined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_under_capacity_keeps_everything() {
        let mut buf = RingBuffer::new(16);
        buf.write(b"This is ");
        buf.write(b"LuaTeX");
        assert_eq!(buf.to_string(), "This is LuaTeX");
        assert!(!buf.was_truncated());
    }

    #[test]
    fn test_evicts_oldest_bytes_across_writes() {
        let mut buf = RingBuffer::new(8);
        buf.write(b"(./doc.tex");
        buf.write(b" [1]");

        assert_eq!(buf.len(), 8);
        assert_eq!(buf.to_string(), ".tex [1]");
        assert_eq!(buf.total_bytes_written(), 14);
        assert!(buf.was_truncated());
    }

    #[test]
    fn test_single_oversized_write_keeps_tail() {
        let mut buf = RingBuffer::new(4);
        buf.write(b"! Undefined control sequence.");
        assert_eq!(buf.into_bytes(), b"nce.");
    }

    #[test]
    fn test_exactly_full_is_not_truncated() {
        let mut buf = RingBuffer::new(5);
        buf.write(b"12345");
        assert_eq!(buf.to_string(), "12345");
        assert!(!buf.was_truncated());
    }

    #[test]
    fn test_zero_capacity_only_counts() {
        let mut buf = RingBuffer::new(0);
        buf.write(b"dropped");
        assert!(buf.is_empty());
        assert_eq!(buf.total_bytes_written(), 7);
    }

    proptest! {
        #[test]
        fn prop_retains_suffix_of_all_input(
            chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..16),
            capacity in 0usize..128,
        ) {
            let mut buf = RingBuffer::new(capacity);
            let all: Vec<u8> = chunks.concat();
            for chunk in &chunks {
                buf.write(chunk);
            }

            prop_assert_eq!(buf.total_bytes_written(), all.len());
            prop_assert_eq!(buf.into_bytes(), all[all.len().saturating_sub(capacity)..].to_vec());
        }
    }
}
