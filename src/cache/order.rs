//! Insertion Order Module
//!
//! Tracks cached URLs by creation time for capacity eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks URLs in the order their entries were created.
///
/// Keys are stored in a VecDeque where:
/// - Front = Newest entry
/// - Back = Oldest entry
///
/// Reads never reorder keys; only a (re)insertion moves a key to the front.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Push ==
    /// Records `key` as the newest entry, dropping any earlier position.
    pub fn push(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest key, or None when empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Iterates keys from oldest to newest.
    pub fn oldest_first(&self) -> impl Iterator<Item = &String> {
        self.order.iter().rev()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
