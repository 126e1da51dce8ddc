//! Bounded, newest-first history of completed feeding sessions.

use std::collections::VecDeque;

use crate::status::{FinishReason, Origin};

/// One resolved feeding session. Immutable once logged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedLogEntry {
    pub manual: bool,
    /// -1 for manual feeds.
    pub slot_index: i8,
    /// Wall-clock time the session resolved.
    pub hour: u8,
    pub minute: u8,
    pub target_g: f32,
    pub final_g: f32,
    /// Bowl weight when the session started.
    pub start_g: f32,
    pub reason: FinishReason,
}

impl FeedLogEntry {
    pub fn origin(&self) -> Origin {
        if self.manual || self.slot_index < 0 {
            Origin::Manual
        } else {
            Origin::Scheduled(self.slot_index as usize)
        }
    }

    /// Grams actually added during the session.
    pub fn dispensed_g(&self) -> f32 {
        (self.final_g - self.start_g).max(0.0)
    }
}

/// Fixed-capacity ring; index 0 is always the newest entry.
#[derive(Debug, Clone)]
pub struct FeedLog {
    entries: VecDeque<FeedLogEntry>,
    capacity: usize,
}

impl FeedLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front; the oldest entry is dropped once full.
    pub fn push(&mut self, entry: FeedLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn get(&self, index: usize) -> Option<&FeedLogEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&FeedLogEntry> {
        self.entries.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &FeedLogEntry> {
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
