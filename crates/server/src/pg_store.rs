//! PostgreSQL-backed schedule store and directory.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use upkeep_core::{ScheduleId, TemplateId, TenantId, TicketId};
use upkeep_schedule::{
    Completion, Frequency, RecurrenceSpec, Schedule, ScheduleFilter, ScheduleStore,
    ScheduleTemplate, StoreError, Target, TargetDirectory, TemplateCatalog, WorkOrderService,
};
use uuid::Uuid;

const SCHEDULE_COLUMNS: &str = "id, tenant_id, template_id, name, description, asset_id, \
     location_id, frequency, day_of_week, day_of_month, month_of_year, assigned_to, vendor_id, \
     estimated_cost, is_active, next_due_date, last_generated_at, created_at, updated_at, deleted_at";

const COMPLETION_COLUMNS: &str = "c.id, c.schedule_id, c.ticket_id, c.scheduled_date, \
     c.completed_date, c.completed_by, c.checklist_results";

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

// ── Rows ─────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct ScheduleRow {
    id: Uuid,
    tenant_id: Uuid,
    template_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    asset_id: Option<Uuid>,
    location_id: Option<Uuid>,
    frequency: String,
    day_of_week: Option<i32>,
    day_of_month: Option<i32>,
    month_of_year: Option<i32>,
    assigned_to: Option<Uuid>,
    vendor_id: Option<Uuid>,
    estimated_cost: Option<f64>,
    is_active: bool,
    next_due_date: NaiveDate,
    last_generated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn column_u32(id: Uuid, column: &str, value: Option<i32>) -> Result<Option<u32>, StoreError> {
    value
        .map(|v| {
            u32::try_from(v).map_err(|_| {
                StoreError::Corrupt(format!("schedule {}: negative {} ({})", id, column, v))
            })
        })
        .transpose()
}

fn column_i32(value: Option<u32>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = StoreError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let frequency: Frequency = row.frequency.parse().map_err(|_| {
            StoreError::Corrupt(format!(
                "schedule {}: unknown frequency '{}'",
                row.id, row.frequency
            ))
        })?;
        let recurrence = RecurrenceSpec {
            frequency,
            day_of_week: column_u32(row.id, "day_of_week", row.day_of_week)?,
            day_of_month: column_u32(row.id, "day_of_month", row.day_of_month)?,
            month_of_year: column_u32(row.id, "month_of_year", row.month_of_year)?,
        };
        Ok(Schedule {
            id: row.id,
            tenant_id: row.tenant_id,
            template_id: row.template_id,
            name: row.name,
            description: row.description,
            asset_id: row.asset_id,
            location_id: row.location_id,
            recurrence,
            assigned_to: row.assigned_to,
            vendor_id: row.vendor_id,
            estimated_cost: row.estimated_cost,
            is_active: row.is_active,
            next_due_date: row.next_due_date,
            last_generated_at: row.last_generated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompletionRow {
    id: Uuid,
    schedule_id: Uuid,
    ticket_id: Option<Uuid>,
    scheduled_date: NaiveDate,
    completed_date: DateTime<Utc>,
    completed_by: Uuid,
    checklist_results: Option<serde_json::Value>,
}

impl From<CompletionRow> for Completion {
    fn from(row: CompletionRow) -> Self {
        Completion {
            id: row.id,
            schedule_id: row.schedule_id,
            ticket_id: row.ticket_id,
            scheduled_date: row.scheduled_date,
            completed_date: row.completed_date,
            completed_by: row.completed_by,
            checklist_results: row.checklist_results,
        }
    }
}

// ── Schedule store ───────────────────────────────────────────────

pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

macro_rules! update_schedule_sql {
    ($guard:literal) => {
        concat!(
            "UPDATE maintenance_schedules SET
                template_id = $3, name = $4, description = $5, asset_id = $6, location_id = $7,
                frequency = $8, day_of_week = $9, day_of_month = $10, month_of_year = $11,
                assigned_to = $12, vendor_id = $13, estimated_cost = $14, is_active = $15,
                next_due_date = $16, last_generated_at = $17, updated_at = $18, deleted_at = $19
             WHERE id = $1 AND tenant_id = $2",
            $guard
        )
    };
}

/// Full-row overwrite; may soft-delete or restore.
const UPDATE_SCHEDULE: &str = update_schedule_sql!("");

/// Full-row overwrite that never touches a soft-deleted row.
const UPDATE_LIVE_SCHEDULE: &str = update_schedule_sql!(" AND deleted_at IS NULL");

/// Overwrite every mutable column of an existing row with `sql`, one of
/// [`UPDATE_SCHEDULE`] or [`UPDATE_LIVE_SCHEDULE`]. Returns rows affected.
async fn write_schedule<'e, E>(executor: E, sql: &'static str, s: &Schedule) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(sql)
        .bind(s.id)
        .bind(s.tenant_id)
        .bind(s.template_id)
        .bind(s.name.clone())
        .bind(s.description.clone())
        .bind(s.asset_id)
        .bind(s.location_id)
        .bind(s.recurrence.frequency.as_str())
        .bind(column_i32(s.recurrence.day_of_week))
        .bind(column_i32(s.recurrence.day_of_month))
        .bind(column_i32(s.recurrence.month_of_year))
        .bind(s.assigned_to)
        .bind(s.vendor_id)
        .bind(s.estimated_cost)
        .bind(s.is_active)
        .bind(s.next_due_date)
        .bind(s.last_generated_at)
        .bind(s.updated_at)
        .bind(s.deleted_at)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn fetch(&self, tenant: TenantId, id: ScheduleId) -> Result<Option<Schedule>, StoreError> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {} FROM maintenance_schedules WHERE tenant_id = $1 AND id = $2",
            SCHEDULE_COLUMNS
        ))
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(Schedule::try_from).transpose()
    }

    async fn insert(&self, s: &Schedule) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO maintenance_schedules ({})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)",
            SCHEDULE_COLUMNS
        ))
        .bind(s.id)
        .bind(s.tenant_id)
        .bind(s.template_id)
        .bind(&s.name)
        .bind(&s.description)
        .bind(s.asset_id)
        .bind(s.location_id)
        .bind(s.recurrence.frequency.as_str())
        .bind(column_i32(s.recurrence.day_of_week))
        .bind(column_i32(s.recurrence.day_of_month))
        .bind(column_i32(s.recurrence.month_of_year))
        .bind(s.assigned_to)
        .bind(s.vendor_id)
        .bind(s.estimated_cost)
        .bind(s.is_active)
        .bind(s.next_due_date)
        .bind(s.last_generated_at)
        .bind(s.created_at)
        .bind(s.updated_at)
        .bind(s.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let affected = write_schedule(&self.pool, UPDATE_SCHEDULE, schedule)
            .await
            .map_err(backend)?;
        if affected == 0 {
            return Err(StoreError::Backend(format!(
                "schedule {} does not exist",
                schedule.id
            )));
        }
        Ok(())
    }

    async fn record_completion(
        &self,
        schedule: &Schedule,
        completion: &Completion,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        // Advance first: a missing or soft-deleted row stops the unit before
        // the completion is inserted, and the dropped transaction rolls back.
        let affected = write_schedule(&mut *tx, UPDATE_LIVE_SCHEDULE, schedule)
            .await
            .map_err(backend)?;
        if affected == 0 {
            return Err(StoreError::Missing(schedule.id));
        }

        sqlx::query(
            "INSERT INTO schedule_completions
                (id, schedule_id, ticket_id, scheduled_date, completed_date, completed_by, checklist_results)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(completion.id)
        .bind(completion.schedule_id)
        .bind(completion.ticket_id)
        .bind(completion.scheduled_date)
        .bind(completion.completed_date)
        .bind(completion.completed_by)
        .bind(completion.checklist_results.clone())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn list(&self, tenant: TenantId, filter: &ScheduleFilter) -> Result<Vec<Schedule>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM maintenance_schedules WHERE deleted_at IS NULL AND tenant_id = ",
            SCHEDULE_COLUMNS
        ));
        qb.push_bind(tenant);
        if let Some(asset_id) = filter.asset_id {
            qb.push(" AND asset_id = ").push_bind(asset_id);
        }
        if let Some(location_id) = filter.location_id {
            qb.push(" AND location_id = ").push_bind(location_id);
        }
        if filter.active_only {
            qb.push(" AND is_active");
        }
        if let Some(day) = filter.due_on {
            qb.push(" AND next_due_date = ").push_bind(day);
        }
        if let Some(day) = filter.due_before {
            qb.push(" AND next_due_date < ").push_bind(day);
        }
        if let Some((from, to)) = filter.due_between {
            qb.push(" AND next_due_date BETWEEN ")
                .push_bind(from)
                .push(" AND ")
                .push_bind(to);
        }
        qb.push(" ORDER BY next_due_date, name");

        let rows = qb
            .build_query_as::<ScheduleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(Schedule::try_from).collect()
    }

    async fn completions(
        &self,
        tenant: TenantId,
        schedule_id: ScheduleId,
    ) -> Result<Vec<Completion>, StoreError> {
        let rows = sqlx::query_as::<_, CompletionRow>(&format!(
            "SELECT {} FROM schedule_completions c
             JOIN maintenance_schedules s ON s.id = c.schedule_id
             WHERE s.tenant_id = $1 AND c.schedule_id = $2
             ORDER BY c.completed_date DESC",
            COMPLETION_COLUMNS
        ))
        .bind(tenant)
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        Ok(rows.into_iter().map(Completion::from).collect())
    }
}

// ── Directory ────────────────────────────────────────────────────

/// Templates, assets, locations and tickets read from their platform tables.
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn target_table(target: Target) -> &'static str {
    match target {
        Target::Asset(_) => "assets",
        Target::Location(_) => "locations",
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    default_vendor_id: Option<Uuid>,
}

#[async_trait]
impl TemplateCatalog for PgDirectory {
    async fn template(
        &self,
        tenant: TenantId,
        id: TemplateId,
    ) -> Result<Option<ScheduleTemplate>, StoreError> {
        let row = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, tenant_id, name, description, default_vendor_id
             FROM maintenance_templates
             WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(row.map(|r| ScheduleTemplate {
            id: r.id,
            tenant_id: r.tenant_id,
            name: r.name,
            description: r.description,
            default_vendor_id: r.default_vendor_id,
        }))
    }
}

#[async_trait]
impl TargetDirectory for PgDirectory {
    async fn exists(&self, tenant: TenantId, target: Target) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL)",
            target_table(target)
        ))
        .bind(tenant)
        .bind(target.id())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }

    async fn display_name(&self, tenant: TenantId, target: Target) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>(&format!(
            "SELECT name FROM {} WHERE tenant_id = $1 AND id = $2",
            target_table(target)
        ))
        .bind(tenant)
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)
    }
}

#[async_trait]
impl WorkOrderService for PgDirectory {
    async fn work_order_exists(&self, tenant: TenantId, ticket_id: TicketId) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tickets WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL)",
        )
        .bind(tenant)
        .bind(ticket_id)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }
}
