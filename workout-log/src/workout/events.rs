//! Outcomes of load and persist work, for observers that want more than logs.

use std::sync::Arc;

use crate::error::StoreError;

/// Capacity of the event channel. Slow observers miss the oldest events.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// Something the store did with its backing file.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The log file was read. `count` is 0 when the file did not exist.
    Loaded { count: usize },
    /// The log file could not be read or decoded; the store is now empty.
    LoadFailed(Arc<StoreError>),
    /// A snapshot of `count` workouts reached disk.
    Persisted { count: usize },
    /// A snapshot was dropped because it could not be written.
    PersistFailed(Arc<StoreError>),
    /// The log file was cleared. `existed` is false if there was nothing to delete.
    Removed { existed: bool },
    /// The log file could not be deleted.
    RemoveFailed(Arc<StoreError>),
}

impl StoreEvent {
    /// The error carried by a failure event.
    #[must_use]
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::LoadFailed(e) | Self::PersistFailed(e) | Self::RemoveFailed(e) => Some(e),
            Self::Loaded { .. } | Self::Persisted { .. } | Self::Removed { .. } => None,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}
