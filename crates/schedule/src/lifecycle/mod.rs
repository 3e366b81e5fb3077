//! Schedule lifecycle: create, update, activate/deactivate, complete, delete.
//!
//! The manager is the single writer of schedule and completion records. All
//! validation happens before the first store call, so a rejected request
//! leaves no partial state behind. "Now" comes from the injected
//! [`ReferenceClock`]; the calculator itself never reads a clock.


use std::sync::Arc;

use tracing::{debug, info, warn};
use upkeep_core::{ScheduleId, TenantId};
use uuid::Uuid;

use crate::clock::ReferenceClock;
use crate::collaborators::{TargetDirectory, TemplateCatalog, WorkOrderService};
use crate::error::{ScheduleError, StoreError};
use crate::model::{Completion, CompletionInput, NewSchedule, Schedule, ScheduleUpdate, Target};
use crate::recurrence::compute_next_due_date;
use crate::store::ScheduleStore;

/// Handles to the collaborators the manager consults.
#[derive(Clone)]
pub struct Collaborators {
    pub templates: Arc<dyn TemplateCatalog>,
    pub targets: Arc<dyn TargetDirectory>,
    pub work_orders: Arc<dyn WorkOrderService>,
}

impl Collaborators {
    /// Use one backend for all three roles.
    pub fn from_directory<D>(directory: Arc<D>) -> Self
    where
        D: TemplateCatalog + TargetDirectory + WorkOrderService + 'static,
    {
        Self {
            templates: directory.clone(),
            targets: directory.clone(),
            work_orders: directory,
        }
    }
}

pub struct ScheduleManager {
    store: Arc<dyn ScheduleStore>,
    collaborators: Collaborators,
    clock: ReferenceClock,
}

impl ScheduleManager {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        collaborators: Collaborators,
        clock: ReferenceClock,
    ) -> Self {
        Self {
            store,
            collaborators,
            clock,
        }
    }

    pub fn clock(&self) -> &ReferenceClock {
        &self.clock
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// A live (not soft-deleted) schedule.
    pub async fn get(&self, tenant: TenantId, id: ScheduleId) -> Result<Schedule, ScheduleError> {
        self.load_live(tenant, id).await
    }

    /// Completion history, newest first. Still answers for soft-deleted
    /// schedules so audit views keep working.
    pub async fn completion_history(
        &self,
        tenant: TenantId,
        id: ScheduleId,
    ) -> Result<Vec<Completion>, ScheduleError> {
        if self.store.fetch(tenant, id).await?.is_none() {
            return Err(ScheduleError::not_found("schedule", id));
        }
        Ok(self.store.completions(tenant, id).await?)
    }

    // ── Create ──────────────────────────────────────────────────────

    pub async fn create(&self, tenant: TenantId, input: NewSchedule) -> Result<Schedule, ScheduleError> {
        let mut input = input;

        if let Some(template_id) = input.template_id {
            let template = self
                .collaborators
                .templates
                .template(tenant, template_id)
                .await?
                .ok_or_else(|| ScheduleError::not_found("template", template_id))?;
            // Template values only fill gaps; caller-supplied values win.
            if is_blank(&input.name) {
                input.name = template.name;
            }
            if input.description.as_deref().map_or(true, is_blank) {
                input.description = template.description;
            }
            if input.vendor_id.is_none() {
                input.vendor_id = template.default_vendor_id;
            }
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            debug!(tenant_id = %tenant, "rejected schedule with empty name");
            return Err(ScheduleError::InvalidName);
        }
        let target = Target::from_parts(input.asset_id, input.location_id)?;
        input.recurrence.validate()?;
        self.ensure_target(tenant, target).await?;

        let now = self.clock.now();
        let today = self.clock.date_of(now);
        let schedule = Schedule {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            template_id: input.template_id,
            name,
            description: input.description,
            asset_id: target.asset_id(),
            location_id: target.location_id(),
            recurrence: input.recurrence,
            assigned_to: input.assigned_to,
            vendor_id: input.vendor_id,
            estimated_cost: input.estimated_cost,
            is_active: true,
            next_due_date: compute_next_due_date(&input.recurrence, today),
            last_generated_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.store.insert(&schedule).await?;
        info!(
            tenant_id = %tenant,
            schedule_id = %schedule.id,
            frequency = %schedule.frequency(),
            next_due = %schedule.next_due_date,
            "schedule created"
        );
        Ok(schedule)
    }

    // ── Update ──────────────────────────────────────────────────────

    pub async fn update(
        &self,
        tenant: TenantId,
        id: ScheduleId,
        patch: ScheduleUpdate,
    ) -> Result<Schedule, ScheduleError> {
        let existing = self.load_live(tenant, id).await?;
        let mut next = existing.clone();

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                debug!(tenant_id = %tenant, schedule_id = %id, "rejected empty name on update");
                return Err(ScheduleError::InvalidName);
            }
            next.name = name;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(asset_id) = patch.asset_id {
            next.asset_id = asset_id;
        }
        if let Some(location_id) = patch.location_id {
            next.location_id = location_id;
        }
        if let Some(frequency) = patch.frequency {
            next.recurrence.frequency = frequency;
        }
        if let Some(day) = patch.day_of_week {
            next.recurrence.day_of_week = day;
        }
        if let Some(day) = patch.day_of_month {
            next.recurrence.day_of_month = day;
        }
        if let Some(month) = patch.month_of_year {
            next.recurrence.month_of_year = month;
        }
        if let Some(assigned_to) = patch.assigned_to {
            next.assigned_to = assigned_to;
        }
        if let Some(vendor_id) = patch.vendor_id {
            next.vendor_id = vendor_id;
        }
        if let Some(cost) = patch.estimated_cost {
            next.estimated_cost = cost;
        }
        if let Some(active) = patch.is_active {
            next.is_active = active;
        }

        // Validate the merged record, not just the incoming fields.
        let target = next.target()?;
        next.recurrence.validate()?;
        if next.asset_id != existing.asset_id || next.location_id != existing.location_id {
            self.ensure_target(tenant, target).await?;
        }

        let now = self.clock.now();
        let recurrence_changed = next.recurrence != existing.recurrence;
        if let Some(due) = patch.next_due_date {
            next.next_due_date = due;
        } else if recurrence_changed {
            next.next_due_date = compute_next_due_date(&next.recurrence, self.clock.date_of(now));
        }
        next.updated_at = now;

        self.store.save(&next).await?;
        info!(
            tenant_id = %tenant,
            schedule_id = %id,
            recurrence_changed,
            next_due = %next.next_due_date,
            "schedule updated"
        );
        Ok(next)
    }

    // ── Activation ──────────────────────────────────────────────────

    pub async fn activate(&self, tenant: TenantId, id: ScheduleId) -> Result<Schedule, ScheduleError> {
        self.set_active(tenant, id, true).await
    }

    pub async fn deactivate(&self, tenant: TenantId, id: ScheduleId) -> Result<Schedule, ScheduleError> {
        self.set_active(tenant, id, false).await
    }

    async fn set_active(
        &self,
        tenant: TenantId,
        id: ScheduleId,
        active: bool,
    ) -> Result<Schedule, ScheduleError> {
        let mut schedule = self.load_live(tenant, id).await?;
        schedule.is_active = active;
        schedule.updated_at = self.clock.now();
        self.store.save(&schedule).await?;
        info!(tenant_id = %tenant, schedule_id = %id, active, "schedule activation changed");
        Ok(schedule)
    }

    // ── Complete ────────────────────────────────────────────────────

    /// Record one completed occurrence and advance the schedule.
    ///
    /// The next due date is computed from the completion moment, not from the
    /// due date being fulfilled: a late completion shifts the cadence forward
    /// by the delay.
    pub async fn complete(
        &self,
        tenant: TenantId,
        id: ScheduleId,
        input: CompletionInput,
    ) -> Result<Completion, ScheduleError> {
        let mut schedule = self.load_live(tenant, id).await?;

        if let Some(ticket_id) = input.ticket_id {
            let exists = self
                .collaborators
                .work_orders
                .work_order_exists(tenant, ticket_id)
                .await?;
            if !exists {
                warn!(tenant_id = %tenant, schedule_id = %id, ticket_id = %ticket_id, "completion references unknown work order");
                return Err(ScheduleError::not_found("work order", ticket_id));
            }
        }

        let now = self.clock.now();
        let previous_due = schedule.next_due_date;
        let completion = Completion {
            id: Uuid::new_v4(),
            schedule_id: schedule.id,
            ticket_id: input.ticket_id,
            scheduled_date: previous_due,
            completed_date: now,
            completed_by: input.completed_by,
            checklist_results: input.checklist_results,
        };

        schedule.next_due_date = compute_next_due_date(&schedule.recurrence, self.clock.date_of(now));
        schedule.last_generated_at = Some(now);
        schedule.updated_at = now;

        self.store
            .record_completion(&schedule, &completion)
            .await
            .map_err(|e| match e {
                StoreError::Missing(id) => ScheduleError::not_found("schedule", id),
                other => ScheduleError::Store(other),
            })?;
        info!(
            tenant_id = %tenant,
            schedule_id = %id,
            completion_id = %completion.id,
            previous_due = %previous_due,
            next_due = %schedule.next_due_date,
            "schedule completed"
        );
        Ok(completion)
    }

    // ── Delete ──────────────────────────────────────────────────────

    /// Soft delete. The row and its completions stay for audit.
    pub async fn delete(&self, tenant: TenantId, id: ScheduleId) -> Result<(), ScheduleError> {
        let mut schedule = self.load_live(tenant, id).await?;
        let now = self.clock.now();
        schedule.deleted_at = Some(now);
        schedule.updated_at = now;
        self.store.save(&schedule).await?;
        info!(tenant_id = %tenant, schedule_id = %id, "schedule deleted");
        Ok(())
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn load_live(&self, tenant: TenantId, id: ScheduleId) -> Result<Schedule, ScheduleError> {
        self.store
            .fetch(tenant, id)
            .await?
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| ScheduleError::not_found("schedule", id))
    }

    async fn ensure_target(&self, tenant: TenantId, target: Target) -> Result<(), ScheduleError> {
        if self.collaborators.targets.exists(tenant, target).await? {
            Ok(())
        } else {
            warn!(tenant_id = %tenant, target = target.kind(), target_id = %target.id(), "schedule target not found");
            Err(ScheduleError::not_found(target.kind(), target.id()))
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
