//! In-memory change sinks.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::task::ports::{TaskChange, TaskChangeSink};

/// Sink that discards every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChangeSink;

#[async_trait]
impl TaskChangeSink for NoopChangeSink {
    async fn publish(&self, _change: TaskChange) {}
}

/// Sink that keeps every published change, for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingChangeSink {
    changes: Arc<Mutex<Vec<TaskChange>>>,
}

impl RecordingChangeSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the changes published so far, oldest first.
    #[must_use]
    pub fn changes(&self) -> Vec<TaskChange> {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TaskChangeSink for RecordingChangeSink {
    async fn publish(&self, change: TaskChange) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(change);
    }
}
