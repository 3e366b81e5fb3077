//! Recurrence calculation: given a recurrence description and an explicit
//! reference date, decide the calendar date a task is next due.
//!
//! Everything here is pure. "Today" is always passed in by the caller; see
//! [`crate::clock::ReferenceClock`] for where the lifecycle manager gets it.
//!
//! Month and year arithmetic cannot be expressed as a fixed day offset, so
//! each frequency family runs its own advance, anchor, clamp sequence. A
//! requested day-of-month that does not exist in the target month is clamped
//! to the month's last day, never rolled forward into the next month.

mod calendar;
mod next_due;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

pub use calendar::{clamp_day, days_in_month, first_day_of_month, last_day_of_month};
pub use next_due::{compute_next_due_date, preview_occurrences, MAX_PREVIEW_COUNT};

// ── Frequency ───────────────────────────────────────────────────────

/// Recurrence family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::SemiAnnually,
        Frequency::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::SemiAnnually => "semi_annually",
            Frequency::Annually => "annually",
        }
    }

    /// Whether `day_of_week` means anything for this frequency.
    pub fn uses_day_of_week(&self) -> bool {
        matches!(self, Frequency::Weekly | Frequency::Biweekly)
    }

    /// Whether `day_of_month` means anything for this frequency.
    pub fn uses_day_of_month(&self) -> bool {
        matches!(
            self,
            Frequency::Monthly | Frequency::Quarterly | Frequency::SemiAnnually | Frequency::Annually
        )
    }

    /// Whether `month_of_year` (the anchor month) means anything for this frequency.
    pub fn uses_month_of_year(&self) -> bool {
        matches!(
            self,
            Frequency::Quarterly | Frequency::SemiAnnually | Frequency::Annually
        )
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| ScheduleError::InvalidRecurrence(format!("unknown frequency '{}'", s)))
    }
}

// ── Recurrence description ──────────────────────────────────────────

/// The recurrence fields of a schedule.
///
/// `day_of_week` counts from Sunday (0) to Saturday (6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceSpec {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<u32>,
}

impl RecurrenceSpec {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            day_of_week: None,
            day_of_month: None,
            month_of_year: None,
        }
    }

    pub fn with_day_of_week(mut self, day: u32) -> Self {
        self.day_of_week = Some(day);
        self
    }

    pub fn with_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn with_month_of_year(mut self, month: u32) -> Self {
        self.month_of_year = Some(month);
        self
    }

    /// Boundary validation. [`compute_next_due_date`] assumes a spec that
    /// passed this check.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let freq = self.frequency;

        if let Some(dow) = self.day_of_week {
            if dow > 6 {
                return Err(invalid(format!("day_of_week must be 0-6, got {}", dow)));
            }
            if !freq.uses_day_of_week() {
                return Err(invalid(format!("day_of_week is not used by {} schedules", freq)));
            }
        }

        if let Some(dom) = self.day_of_month {
            if !(1..=31).contains(&dom) {
                return Err(invalid(format!("day_of_month must be 1-31, got {}", dom)));
            }
            if !freq.uses_day_of_month() {
                return Err(invalid(format!("day_of_month is not used by {} schedules", freq)));
            }
        }

        if let Some(moy) = self.month_of_year {
            if !(1..=12).contains(&moy) {
                return Err(invalid(format!("month_of_year must be 1-12, got {}", moy)));
            }
            if !freq.uses_month_of_year() {
                return Err(invalid(format!("month_of_year is not used by {} schedules", freq)));
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> ScheduleError {
    ScheduleError::InvalidRecurrence(msg)
}
