//! Schedule and completion records, plus the request shapes that create and
//! patch them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use upkeep_core::{
    AssetId, CompletionId, LocationId, ScheduleId, TemplateId, TenantId, TicketId, UserId,
    VendorId,
};
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::recurrence::{Frequency, RecurrenceSpec};

// ── Target ──────────────────────────────────────────────────────────

/// What a schedule maintains: a piece of equipment or a site, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Asset(AssetId),
    Location(LocationId),
}

impl Target {
    /// Enforce the exactly-one-of rule on a pair of optional ids.
    pub fn from_parts(
        asset_id: Option<AssetId>,
        location_id: Option<LocationId>,
    ) -> Result<Self, ScheduleError> {
        match (asset_id, location_id) {
            (Some(asset), None) => Ok(Target::Asset(asset)),
            (None, Some(location)) => Ok(Target::Location(location)),
            _ => Err(ScheduleError::InvalidTarget),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Target::Asset(id) | Target::Location(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Asset(_) => "asset",
            Target::Location(_) => "location",
        }
    }

    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            Target::Asset(id) => Some(*id),
            Target::Location(_) => None,
        }
    }

    pub fn location_id(&self) -> Option<LocationId> {
        match self {
            Target::Location(id) => Some(*id),
            Target::Asset(_) => None,
        }
    }
}

// ── Schedule ────────────────────────────────────────────────────────

/// A recurring maintenance definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub tenant_id: TenantId,
    pub template_id: Option<TemplateId>,
    pub name: String,
    pub description: Option<String>,
    pub asset_id: Option<AssetId>,
    pub location_id: Option<LocationId>,
    #[serde(flatten)]
    pub recurrence: RecurrenceSpec,
    pub assigned_to: Option<UserId>,
    pub vendor_id: Option<VendorId>,
    pub estimated_cost: Option<f64>,
    pub is_active: bool,
    /// Authoritative next due date. Only the lifecycle manager writes it.
    pub next_due_date: NaiveDate,
    pub last_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn target(&self) -> Result<Target, ScheduleError> {
        Target::from_parts(self.asset_id, self.location_id)
    }

    pub fn frequency(&self) -> Frequency {
        self.recurrence.frequency
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.is_active && !self.is_deleted() && self.next_due_date == day
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active && !self.is_deleted() && self.next_due_date < today
    }
}

// ── Completion ──────────────────────────────────────────────────────

/// Immutable record that one scheduled occurrence was carried out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: CompletionId,
    pub schedule_id: ScheduleId,
    /// Work order the occurrence was executed through, if any.
    pub ticket_id: Option<TicketId>,
    /// The due date this completion fulfils.
    pub scheduled_date: NaiveDate,
    pub completed_date: DateTime<Utc>,
    pub completed_by: UserId,
    pub checklist_results: Option<serde_json::Value>,
}

// ── Template ────────────────────────────────────────────────────────

/// Read-only template record from the template catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTemplate {
    pub id: TemplateId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub default_vendor_id: Option<VendorId>,
}

// ── Requests ────────────────────────────────────────────────────────

/// Input to `create`. A blank `name`, `description` or `vendor_id` is filled
/// from the referenced template, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSchedule {
    #[serde(default)]
    pub template_id: Option<TemplateId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub asset_id: Option<AssetId>,
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(flatten)]
    pub recurrence: RecurrenceSpec,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

impl NewSchedule {
    pub fn for_asset(name: impl Into<String>, asset_id: AssetId, recurrence: RecurrenceSpec) -> Self {
        Self::blank(name.into(), Some(asset_id), None, recurrence)
    }

    pub fn for_location(
        name: impl Into<String>,
        location_id: LocationId,
        recurrence: RecurrenceSpec,
    ) -> Self {
        Self::blank(name.into(), None, Some(location_id), recurrence)
    }

    fn blank(
        name: String,
        asset_id: Option<AssetId>,
        location_id: Option<LocationId>,
        recurrence: RecurrenceSpec,
    ) -> Self {
        Self {
            template_id: None,
            name,
            description: None,
            asset_id,
            location_id,
            recurrence,
            assigned_to: None,
            vendor_id: None,
            estimated_cost: None,
        }
    }
}

/// Partial update. For nullable fields the outer `Option` means "present in
/// the request" and the inner one carries the new value, so an explicit
/// `null` clears the field while an absent key keeps it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub asset_id: Option<Option<AssetId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub location_id: Option<Option<LocationId>>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default, deserialize_with = "nullable")]
    pub day_of_week: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub day_of_month: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub month_of_year: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_to: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub vendor_id: Option<Option<VendorId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_cost: Option<Option<f64>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Explicit override. When present the calculator is not consulted.
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Input to `complete`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionInput {
    #[serde(default)]
    pub ticket_id: Option<TicketId>,
    pub completed_by: UserId,
    #[serde(default)]
    pub checklist_results: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requires_exactly_one_id() {
        let a = Uuid::new_v4();
        let l = Uuid::new_v4();
        assert_eq!(Target::from_parts(Some(a), None).unwrap(), Target::Asset(a));
        assert_eq!(Target::from_parts(None, Some(l)).unwrap(), Target::Location(l));
        assert!(matches!(
            Target::from_parts(Some(a), Some(l)),
            Err(ScheduleError::InvalidTarget)
        ));
        assert!(matches!(
            Target::from_parts(None, None),
            Err(ScheduleError::InvalidTarget)
        ));
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: ScheduleUpdate =
            serde_json::from_str(r#"{"asset_id": null, "day_of_month": 15}"#).unwrap();
        assert_eq!(update.asset_id, Some(None));
        assert_eq!(update.day_of_month, Some(Some(15)));
        assert_eq!(update.location_id, None);
        assert_eq!(update.name, None);
    }

    #[test]
    fn new_schedule_reads_flat_recurrence_fields() {
        let input: NewSchedule = serde_json::from_str(
            r#"{
                "name": "Filter swap",
                "location_id": "6c1b8bde-8a0e-4a43-9a8e-0d1bde4f3a11",
                "frequency": "quarterly",
                "month_of_year": 3,
                "day_of_month": 31
            }"#,
        )
        .unwrap();
        assert_eq!(input.recurrence.frequency, Frequency::Quarterly);
        assert_eq!(input.recurrence.month_of_year, Some(3));
        assert_eq!(input.recurrence.day_of_week, None);
        assert!(input.asset_id.is_none());
    }
}
