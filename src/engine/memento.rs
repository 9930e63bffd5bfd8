//! History snapshots used for undo/redo.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::calculation::Calculation;

/// An immutable capture of the history at one point in time.
///
/// The engine exclusively owns its memento stacks; records are immutable, so
/// copying the sequence (not deep-cloning each record) is enough to prevent
/// aliasing between a snapshot and the live history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMemento {
    history: Vec<Calculation>,
    timestamp: DateTime<Local>,
}

impl HistoryMemento {
    /// Snapshot the given history as of now.
    pub fn capture(history: &[Calculation]) -> Self {
        Self {
            history: history.to_vec(),
            timestamp: Local::now(),
        }
    }

    /// The captured records, in chronological order.
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    /// When the snapshot was taken.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Consume the snapshot, yielding the captured history.
    pub fn into_history(self) -> Vec<Calculation> {
        self.history
    }
}
