// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded log of completed deliveries

use crate::delivery::DeliverySnapshot;
use ces_core::ALL_USER;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct History {
    capacity: usize,
    entries: VecDeque<DeliverySnapshot>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, entry: DeliverySnapshot) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries oldest first, filtered by event (empty for any) and user
    /// (`ALL_USER` for any)
    pub fn filtered(&self, event: &str, user_id: i32) -> Vec<DeliverySnapshot> {
        self.entries
            .iter()
            .filter(|e| event.is_empty() || e.action() == event)
            .filter(|e| user_id == ALL_USER || e.record.user_id == user_id)
            .cloned()
            .collect()
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
