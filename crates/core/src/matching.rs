// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription filters over event name, entity and scheme

use crate::want::Want;
use serde::{Deserialize, Serialize};

/// Filter deciding which wants a subscriber accepts.
///
/// A want matches when:
///   - its action is one of `events` (exact match)
///   - every entity on the want is listed in `entities` (a want without
///     entities always passes)
///   - if `schemes` is non-empty, the want's scheme is one of them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingSkills {
    events: Vec<String>,
    #[serde(default)]
    entities: Vec<String>,
    #[serde(default)]
    schemes: Vec<String>,
}

impl MatchingSkills {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a set of event names
    pub fn for_events<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut skills = Self::new();
        for event in events {
            skills.add_event(event);
        }
        skills
    }

    /// Add an event name; duplicates are ignored
    pub fn add_event(&mut self, event: impl Into<String>) {
        push_unique(&mut self.events, event.into());
    }

    pub fn add_entity(&mut self, entity: impl Into<String>) {
        push_unique(&mut self.entities, entity.into());
    }

    pub fn add_scheme(&mut self, scheme: impl Into<String>) {
        push_unique(&mut self.schemes, scheme.into());
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.add_entity(entity);
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.add_scheme(scheme);
        self
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    /// Check whether the want passes this filter
    pub fn matches(&self, want: &Want) -> bool {
        self.match_event(&want.action)
            && self.match_entities(&want.entities)
            && self.match_scheme(&want.scheme)
    }

    fn match_event(&self, action: &str) -> bool {
        !action.is_empty() && self.has_event(action)
    }

    fn match_entities(&self, entities: &[String]) -> bool {
        entities
            .iter()
            .all(|entity| self.entities.iter().any(|e| e == entity))
    }

    fn match_scheme(&self, scheme: &str) -> bool {
        self.schemes.is_empty() || self.schemes.iter().any(|s| s == scheme)
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
#[path = "matching_tests.rs"]
mod tests;
