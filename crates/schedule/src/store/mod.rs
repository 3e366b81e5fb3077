//! Tenant-scoped record store for schedules and completions.
//!
//! The lifecycle manager is the only writer. Implementations must make
//! [`ScheduleStore::record_completion`] atomic: either both the completion row
//! and the advanced schedule are visible, or neither is.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use upkeep_core::{AssetId, LocationId, ScheduleId, TenantId};

use crate::error::StoreError;
use crate::model::{Completion, Schedule};

pub use memory::InMemoryScheduleStore;

/// Narrowing applied by [`ScheduleStore::list`]. Soft-deleted schedules are
/// never returned. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleFilter {
    pub asset_id: Option<AssetId>,
    pub location_id: Option<LocationId>,
    pub active_only: bool,
    pub due_on: Option<NaiveDate>,
    /// Strictly before this date.
    pub due_before: Option<NaiveDate>,
    /// Inclusive range.
    pub due_between: Option<(NaiveDate, NaiveDate)>,
}

impl ScheduleFilter {
    pub fn active() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, schedule: &Schedule) -> bool {
        if schedule.is_deleted() {
            return false;
        }
        if self.active_only && !schedule.is_active {
            return false;
        }
        if let Some(asset) = self.asset_id {
            if schedule.asset_id != Some(asset) {
                return false;
            }
        }
        if let Some(location) = self.location_id {
            if schedule.location_id != Some(location) {
                return false;
            }
        }
        if let Some(day) = self.due_on {
            if schedule.next_due_date != day {
                return false;
            }
        }
        if let Some(day) = self.due_before {
            if schedule.next_due_date >= day {
                return false;
            }
        }
        if let Some((from, to)) = self.due_between {
            if schedule.next_due_date < from || schedule.next_due_date > to {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Load one schedule, soft-deleted or not. `None` when the id does not
    /// exist within `tenant`.
    async fn fetch(&self, tenant: TenantId, id: ScheduleId) -> Result<Option<Schedule>, StoreError>;

    async fn insert(&self, schedule: &Schedule) -> Result<(), StoreError>;

    /// Replace the stored row (last write wins).
    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError>;

    /// Append `completion` and persist the advanced `schedule` as one unit.
    /// Fails with [`StoreError::Missing`], writing nothing, when the stored
    /// row is absent, belongs to another tenant or has been soft-deleted.
    async fn record_completion(
        &self,
        schedule: &Schedule,
        completion: &Completion,
    ) -> Result<(), StoreError>;

    /// Non-deleted schedules of `tenant` matching `filter`, ordered by
    /// `next_due_date` then name.
    async fn list(&self, tenant: TenantId, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StoreError>;

    /// Completion history for one schedule, newest first. Includes history of
    /// soft-deleted schedules.
    async fn completions(
        &self,
        tenant: TenantId,
        schedule_id: ScheduleId,
    ) -> Result<Vec<Completion>, StoreError>;
}
