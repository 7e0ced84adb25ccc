//! Line buffer
//!
//! Ordered storage for received log lines with an optional capacity.
//! When a capacity is set, appending past it evicts the oldest lines.

use std::collections::VecDeque;

/// Ordered line storage
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: VecDeque<String>,
    capacity: Option<usize>,
    /// Lines appended over the buffer's lifetime (survives clear/eviction)
    total_appended: u64,
    evicted: u64,
}

impl LineBuffer {
    /// Unbounded buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer keeping at most `capacity` lines (`None` = unbounded)
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push_back(line);
        self.total_appended += 1;
        self.evict_overflow();
    }

    /// Change the capacity, evicting the oldest lines that no longer fit
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
        self.evict_overflow();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Lines appended since creation, including cleared and evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Lines dropped by the capacity policy
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.lines.iter().map(String::as_str)
    }

    /// Snapshot of the buffer as an owned vector
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    fn evict_overflow(&mut self) {
        if let Some(cap) = self.capacity {
            while self.lines.len() > cap {
                if self.lines.pop_front().is_some() {
                    self.evicted += 1;
                }
            }
        }
    }
}

impl PartialEq<[&str]> for LineBuffer {
    fn eq(&self, other: &[&str]) -> bool {
        self.lines.len() == other.len() && self.lines.iter().zip(other).all(|(a, b)| a == b)
    }
}
