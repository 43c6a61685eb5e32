use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::instruction::Instruction;

/// One executed instruction and the address it was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub address: usize,
    pub instruction: Instruction,
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}: {}", self.address, self.instruction)
    }
}

/// Keeps the most recent executed instructions.
///
/// When full, pushing a new entry drops the oldest one. A history with
/// capacity 0 records nothing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct History {
    capacity: usize,
    entries: VecDeque<TraceEntry>,
}

impl History {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: TraceEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
