// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Last sticky record per event name

use ces_core::{EventRecord, ALL_USER};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct StickyEventCache {
    events: Mutex<HashMap<String, EventRecord>>,
}

impl StickyEventCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, EventRecord>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cached records for the given event names, in the order asked
    pub fn find(&self, events: &[String]) -> Vec<EventRecord> {
        let cache = self.lock();
        events
            .iter()
            .filter_map(|event| cache.get(event).cloned())
            .collect()
    }

    pub fn get(&self, event: &str) -> Option<EventRecord> {
        self.lock().get(event).cloned()
    }

    /// Replace the cached record for `event`
    pub fn update(&self, event: &str, record: EventRecord) {
        tracing::debug!(event, "sticky event updated");
        self.lock().insert(event.to_string(), record);
    }

    /// Records for diagnostics, sorted by event name
    pub fn records(&self, event: &str, user_id: i32) -> Vec<EventRecord> {
        let mut records: Vec<EventRecord> = self
            .lock()
            .iter()
            .filter(|(name, _)| event.is_empty() || name.as_str() == event)
            .filter(|(_, r)| user_id == ALL_USER || r.user_id == user_id)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by(|a, b| a.action().cmp(b.action()));
        records
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
