//! Transition history tracking.
//!
//! Machines built with history recording append one record per completed
//! transition. Records hold rendered labels rather than state handles, so a
//! history outlives the states and can be serialised for diagnostics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single transition between two distinct states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Label of the state that was exited
    pub from: String,
    /// Label of the state that was entered
    pub to: String,
    /// Debug rendering of the event that caused the transition
    pub event: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of transitions.
///
/// # Example
///
/// ```rust
/// use statemach::core::{History, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = History::new();
/// history.record(TransitionRecord {
///     from: "red".to_string(),
///     to: "green".to_string(),
///     event: "RedTimeout".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["red", "green"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    records: Vec<TransitionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a transition.
    pub fn record(&mut self, record: TransitionRecord) {
        self.records.push(record);
    }

    /// Labels of the states traversed: the first `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Time between the first and last transition, `None` if empty.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
