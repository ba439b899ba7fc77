//! Per-player bounded position history
//!
//! A FIFO ring of the most recent reported positions, kept for diagnostics
//! and anti-jitter tooling. Nothing else in the core consumes it.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::ws::protocol::Vec3;

/// Maximum entries retained per player
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionHistoryEntry {
    pub position: Vec3,
    pub timestamp: u64,
}

/// Bounded FIFO ring of recent positions, oldest evicted first
#[derive(Debug, Clone, Default)]
pub struct PositionHistory {
    entries: VecDeque<PositionHistoryEntry>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append an entry, evicting the oldest when at capacity
    pub fn push(&mut self, position: Vec3, timestamp: u64) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(PositionHistoryEntry {
            position,
            timestamp,
        });
    }

    /// Clear and reseed with a single entry (used on respawn)
    pub fn reset(&mut self, position: Vec3, timestamp: u64) {
        self.entries.clear();
        self.push(position, timestamp);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PositionHistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&PositionHistoryEntry> {
        self.entries.back()
    }
}
