use chrono::{Datelike, Days, Months, NaiveDate};

use super::calendar::clamp_day;
use super::{Frequency, RecurrenceSpec};

/// Next due date strictly after `reference`.
///
/// Total over validated specs. Dates past the end of chrono's range saturate
/// to `NaiveDate::MAX`.
pub fn compute_next_due_date(spec: &RecurrenceSpec, reference: NaiveDate) -> NaiveDate {
    next_due(spec, reference).unwrap_or(NaiveDate::MAX)
}

/// Upper bound callers place on a single preview request.
pub const MAX_PREVIEW_COUNT: usize = 100;

/// The next `count` due dates, each computed from the previous one.
pub fn preview_occurrences(spec: &RecurrenceSpec, from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    std::iter::successors(Some(compute_next_due_date(spec, from)), |prev| {
        (*prev < NaiveDate::MAX).then(|| compute_next_due_date(spec, *prev))
    })
    .take(count)
    .collect()
}

fn next_due(spec: &RecurrenceSpec, reference: NaiveDate) -> Option<NaiveDate> {
    match spec.frequency {
        Frequency::Daily => reference.checked_add_days(Days::new(1)),
        Frequency::Weekly => match spec.day_of_week {
            Some(dow) => next_weekday_after(reference, dow),
            None => reference.checked_add_days(Days::new(7)),
        },
        Frequency::Biweekly => match spec.day_of_week {
            Some(dow) => next_weekday_after(reference, dow)?.checked_add_days(Days::new(7)),
            None => reference.checked_add_days(Days::new(14)),
        },
        Frequency::Monthly => {
            let base = reference.checked_add_months(Months::new(1))?;
            with_day_of_month(base, spec.day_of_month)
        }
        Frequency::Quarterly => anchored(reference, spec, 3),
        Frequency::SemiAnnually => anchored(reference, spec, 6),
        Frequency::Annually => {
            let base = reference.checked_add_months(Months::new(12))?;
            let base = match spec.month_of_year {
                Some(anchor) => clamp_day(base.year(), anchor, base.day())?,
                None => base,
            };
            with_day_of_month(base, spec.day_of_month)
        }
    }
}

/// First date after `reference` falling on `dow` (0 = Sunday). Never the
/// reference date itself: a same-weekday reference advances a full week.
fn next_weekday_after(reference: NaiveDate, dow: u32) -> Option<NaiveDate> {
    let current = reference.weekday().num_days_from_sunday();
    let ahead = match (dow % 7 + 7 - current) % 7 {
        0 => 7,
        n => n,
    };
    reference.checked_add_days(Days::new(u64::from(ahead)))
}

/// Quarterly and semi-annual rule. With an anchor month the candidate months
/// are `anchor, anchor + step, ...` (mod 12); the smallest candidate after the
/// reference month wins, wrapping to the earliest candidate next year.
fn anchored(reference: NaiveDate, spec: &RecurrenceSpec, step: u32) -> Option<NaiveDate> {
    let Some(anchor) = spec.month_of_year else {
        let base = reference.checked_add_months(Months::new(step))?;
        return with_day_of_month(base, spec.day_of_month);
    };

    let candidates: Vec<u32> = (0..12 / step)
        .map(|k| (anchor + 11 + k * step) % 12 + 1)
        .collect();

    let month = reference.month();
    let (year, target) = match candidates.iter().copied().filter(|&m| m > month).min() {
        Some(m) => (reference.year(), m),
        None => (reference.year().checked_add(1)?, candidates.iter().copied().min()?),
    };

    let day = spec.day_of_month.unwrap_or(reference.day());
    clamp_day(year, target, day)
}

fn with_day_of_month(base: NaiveDate, day_of_month: Option<u32>) -> Option<NaiveDate> {
    match day_of_month {
        Some(day) => clamp_day(base.year(), base.month(), day),
        None => Some(base),
    }
}
