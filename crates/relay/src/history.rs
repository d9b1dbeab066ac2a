// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::VecDeque;

/// Default number of messages replayed to new joiners.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Fixed-capacity FIFO of the most recent messages.
///
/// Pushing past capacity drops the oldest entry. Insertion order is the
/// replay order.
#[derive(Debug)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append an entry, returning the evicted one if the buffer was full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
