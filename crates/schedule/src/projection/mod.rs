//! Read-only views over live schedules for dashboards and calendars.


use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use upkeep_core::{AssetId, LocationId, ScheduleId, TenantId};

use crate::clock::ReferenceClock;
use crate::collaborators::TargetDirectory;
use crate::error::ScheduleError;
use crate::model::{Schedule, Target};
use crate::recurrence::{first_day_of_month, last_day_of_month, Frequency};
use crate::store::{ScheduleFilter, ScheduleStore};

/// One schedule occurrence inside a calendar window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub schedule_id: ScheduleId,
    pub name: String,
    pub target_name: String,
    pub frequency: Frequency,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total: usize,
    pub active: usize,
    pub due_today: usize,
    pub overdue: usize,
}

pub struct ScheduleProjections {
    store: Arc<dyn ScheduleStore>,
    targets: Arc<dyn TargetDirectory>,
    clock: ReferenceClock,
    calendar_max_items: usize,
}

impl ScheduleProjections {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        targets: Arc<dyn TargetDirectory>,
        clock: ReferenceClock,
    ) -> Self {
        Self {
            store,
            targets,
            clock,
            calendar_max_items: 1000,
        }
    }

    pub fn with_calendar_limit(mut self, max_items: usize) -> Self {
        self.calendar_max_items = max_items;
        self
    }

    pub async fn list(
        &self,
        tenant: TenantId,
        filter: &ScheduleFilter,
    ) -> Result<Vec<Schedule>, ScheduleError> {
        Ok(self.store.list(tenant, filter).await?)
    }

    pub async fn by_asset(&self, tenant: TenantId, asset_id: AssetId) -> Result<Vec<Schedule>, ScheduleError> {
        let filter = ScheduleFilter {
            asset_id: Some(asset_id),
            ..ScheduleFilter::default()
        };
        self.list(tenant, &filter).await
    }

    pub async fn by_location(
        &self,
        tenant: TenantId,
        location_id: LocationId,
    ) -> Result<Vec<Schedule>, ScheduleError> {
        let filter = ScheduleFilter {
            location_id: Some(location_id),
            ..ScheduleFilter::default()
        };
        self.list(tenant, &filter).await
    }

    pub async fn active(&self, tenant: TenantId) -> Result<Vec<Schedule>, ScheduleError> {
        self.list(tenant, &ScheduleFilter::active()).await
    }

    /// Active schedules whose next due date is today.
    pub async fn due_today(&self, tenant: TenantId) -> Result<Vec<Schedule>, ScheduleError> {
        let filter = ScheduleFilter {
            due_on: Some(self.clock.today()),
            ..ScheduleFilter::active()
        };
        self.list(tenant, &filter).await
    }

    /// Active schedules whose next due date has already passed.
    pub async fn overdue(&self, tenant: TenantId) -> Result<Vec<Schedule>, ScheduleError> {
        let filter = ScheduleFilter {
            due_before: Some(self.clock.today()),
            ..ScheduleFilter::active()
        };
        self.list(tenant, &filter).await
    }

    /// Active schedules due within the given month, ascending by date.
    pub async fn calendar(
        &self,
        tenant: TenantId,
        month: u32,
        year: i32,
    ) -> Result<Vec<CalendarItem>, ScheduleError> {
        let (Some(from), Some(to)) = (first_day_of_month(year, month), last_day_of_month(year, month)) else {
            return Err(ScheduleError::InvalidWindow(format!(
                "no such month: {}-{:02}",
                year, month
            )));
        };

        let filter = ScheduleFilter {
            due_between: Some((from, to)),
            ..ScheduleFilter::active()
        };
        let schedules = self.store.list(tenant, &filter).await?;

        let mut names: HashMap<Target, String> = HashMap::new();
        let mut items = Vec::with_capacity(schedules.len().min(self.calendar_max_items));
        for schedule in schedules {
            let target_name = match schedule.target() {
                Ok(target) => self.target_name(tenant, target, &mut names).await?,
                Err(_) => "Unknown".to_string(),
            };
            items.push(CalendarItem {
                schedule_id: schedule.id,
                name: schedule.name,
                target_name,
                frequency: schedule.recurrence.frequency,
                due_date: schedule.next_due_date,
            });
        }

        items.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        if items.len() > self.calendar_max_items {
            debug!(
                tenant_id = %tenant,
                total = items.len(),
                limit = self.calendar_max_items,
                "calendar window truncated"
            );
            items.truncate(self.calendar_max_items);
        }
        Ok(items)
    }

    /// Aggregate counts over live schedules.
    pub async fn stats(&self, tenant: TenantId) -> Result<ScheduleStats, ScheduleError> {
        let today = self.clock.today();
        let schedules = self.store.list(tenant, &ScheduleFilter::default()).await?;
        Ok(schedules.iter().fold(ScheduleStats::default(), |mut acc, s| {
            acc.total += 1;
            if s.is_active {
                acc.active += 1;
            }
            if s.is_due_on(today) {
                acc.due_today += 1;
            }
            if s.is_overdue(today) {
                acc.overdue += 1;
            }
            acc
        }))
    }

    async fn target_name(
        &self,
        tenant: TenantId,
        target: Target,
        cache: &mut HashMap<Target, String>,
    ) -> Result<String, ScheduleError> {
        if let Some(name) = cache.get(&target) {
            return Ok(name.clone());
        }
        let name = self
            .targets
            .display_name(tenant, target)
            .await?
            .unwrap_or_else(|| format!("Unknown {}", target.kind()));
        cache.insert(target, name.clone());
        Ok(name)
    }
}
