//! Scheduling error types.

use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a record store or collaborator backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The row to write is absent, owned by another tenant or soft-deleted.
    #[error("record {0} is missing or deleted")]
    Missing(Uuid),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("schedule must target exactly one of asset_id or location_id")]
    InvalidTarget,

    #[error("schedule name must not be empty")]
    InvalidName,

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("invalid calendar window: {0}")]
    InvalidWindow(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ScheduleError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        ScheduleError::NotFound { entity, id }
    }

    /// Whether the caller sent something the engine refuses (as opposed to a
    /// missing record or a backend failure).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidTarget
                | ScheduleError::InvalidName
                | ScheduleError::InvalidRecurrence(_)
                | ScheduleError::InvalidWindow(_)
        )
    }
}
