use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use upkeep_core::{ScheduleId, TenantId};

use super::{ScheduleFilter, ScheduleStore};
use crate::error::StoreError;
use crate::model::{Completion, Schedule};

#[derive(Default)]
struct MemoryState {
    schedules: HashMap<ScheduleId, Schedule>,
    completions: Vec<Completion>,
}

/// Process-local store. Backs the server when PostgreSQL is not configured,
/// and the test suites.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    state: RwLock<MemoryState>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total completion rows across all tenants.
    pub async fn completion_count(&self) -> usize {
        self.state.read().await.completions.len()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn fetch(&self, tenant: TenantId, id: ScheduleId) -> Result<Option<Schedule>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .schedules
            .get(&id)
            .filter(|s| s.tenant_id == tenant)
            .cloned())
    }

    async fn insert(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.schedules.contains_key(&schedule.id) {
            return Err(StoreError::Backend(format!(
                "duplicate schedule id {}",
                schedule.id
            )));
        }
        state.schedules.insert(schedule.id, schedule.clone());
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        match state.schedules.get_mut(&schedule.id) {
            Some(existing) if existing.tenant_id == schedule.tenant_id => {
                *existing = schedule.clone();
                Ok(())
            }
            _ => Err(StoreError::Backend(format!(
                "schedule {} does not exist",
                schedule.id
            ))),
        }
    }

    async fn record_completion(
        &self,
        schedule: &Schedule,
        completion: &Completion,
    ) -> Result<(), StoreError> {
        // Single write guard: readers see both changes or neither.
        let mut state = self.state.write().await;
        let existing = state
            .schedules
            .get_mut(&schedule.id)
            .filter(|s| s.tenant_id == schedule.tenant_id && !s.is_deleted())
            .ok_or(StoreError::Missing(schedule.id))?;
        *existing = schedule.clone();
        state.completions.push(completion.clone());
        Ok(())
    }

    async fn list(&self, tenant: TenantId, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StoreError> {
        let state = self.state.read().await;
        let mut out: Vec<Schedule> = state
            .schedules
            .values()
            .filter(|s| s.tenant_id == tenant && filter.matches(s))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.next_due_date
                .cmp(&b.next_due_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(out)
    }

    async fn completions(
        &self,
        tenant: TenantId,
        schedule_id: ScheduleId,
    ) -> Result<Vec<Completion>, StoreError> {
        let state = self.state.read().await;
        let owned = state
            .schedules
            .get(&schedule_id)
            .is_some_and(|s| s.tenant_id == tenant);
        if !owned {
            return Ok(Vec::new());
        }
        let mut out: Vec<Completion> = state
            .completions
            .iter()
            .filter(|c| c.schedule_id == schedule_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
        Ok(out)
    }
}
