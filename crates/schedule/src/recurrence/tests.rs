use chrono::{Datelike, NaiveDate, Weekday};

use super::*;
use crate::error::ScheduleError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn next(spec: RecurrenceSpec, reference: NaiveDate) -> NaiveDate {
    compute_next_due_date(&spec, reference)
}

// -- daily / weekly / biweekly ----------------------------------------------

#[test]
fn daily_adds_one_day() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Daily), date(2026, 2, 28)), date(2026, 3, 1));
    assert_eq!(next(RecurrenceSpec::new(Frequency::Daily), date(2026, 12, 31)), date(2027, 1, 1));
}

#[test]
fn weekly_without_weekday_adds_seven_days() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Weekly), date(2026, 1, 14)), date(2026, 1, 21));
}

#[test]
fn weekly_seeks_next_weekday() {
    // 2026-01-14 is a Wednesday; Friday is two days later.
    assert_eq!(date(2026, 1, 14).weekday(), Weekday::Wed);
    let spec = RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(5);
    assert_eq!(next(spec, date(2026, 1, 14)), date(2026, 1, 16));

    // Monday is behind Wednesday, so it lands in the following week.
    let spec = RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(1);
    assert_eq!(next(spec, date(2026, 1, 14)), date(2026, 1, 19));
}

#[test]
fn weekly_same_weekday_never_advances_zero_days() {
    let spec = RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(3);
    assert_eq!(next(spec, date(2026, 1, 14)), date(2026, 1, 21));
}

#[test]
fn weekly_sunday_is_day_zero() {
    let spec = RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(0);
    let due = next(spec, date(2026, 1, 14));
    assert_eq!(due, date(2026, 1, 18));
    assert_eq!(due.weekday(), Weekday::Sun);
}

#[test]
fn weekly_crosses_year_boundary() {
    let spec = RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(1);
    assert_eq!(next(spec, date(2026, 12, 30)), date(2027, 1, 4));
}

#[test]
fn biweekly_takes_second_occurrence_of_weekday() {
    let spec = RecurrenceSpec::new(Frequency::Biweekly).with_day_of_week(5);
    assert_eq!(next(spec, date(2026, 1, 14)), date(2026, 1, 23));
}

#[test]
fn biweekly_same_weekday_advances_fourteen_days() {
    let spec = RecurrenceSpec::new(Frequency::Biweekly).with_day_of_week(3);
    assert_eq!(next(spec, date(2026, 1, 14)), date(2026, 1, 28));
}

#[test]
fn biweekly_without_weekday_adds_fourteen_days() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Biweekly), date(2026, 1, 14)), date(2026, 1, 28));
}

// -- monthly ------------------------------------------------------------------

#[test]
fn monthly_without_day_keeps_reference_day() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Monthly), date(2026, 1, 15)), date(2026, 2, 15));
}

#[test]
fn monthly_without_day_clamps_month_end() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Monthly), date(2026, 1, 31)), date(2026, 2, 28));
}

#[test]
fn monthly_day_31_clamps_to_short_months() {
    let spec = RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(31);
    assert_eq!(next(spec, date(2026, 1, 15)), date(2026, 2, 28));
    assert_eq!(next(spec, date(2026, 3, 15)), date(2026, 4, 30));
    assert_eq!(next(spec, date(2026, 4, 15)), date(2026, 5, 31));
}

#[test]
fn monthly_day_29_respects_leap_years() {
    let spec = RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(29);
    assert_eq!(next(spec, date(2028, 1, 10)), date(2028, 2, 29));
    assert_eq!(next(spec, date(2026, 1, 10)), date(2026, 2, 28));
}

#[test]
fn monthly_early_day_still_lands_next_month() {
    let spec = RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(1);
    assert_eq!(next(spec, date(2026, 1, 31)), date(2026, 2, 1));
}

// -- quarterly / semi-annual ---------------------------------------------------

#[test]
fn quarterly_without_anchor_adds_three_months() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Quarterly), date(2026, 11, 30)), date(2027, 2, 28));
}

#[test]
fn quarterly_anchor_picks_next_candidate_month() {
    // Anchor 3 => Mar / Jun / Sep / Dec.
    let spec = RecurrenceSpec::new(Frequency::Quarterly).with_month_of_year(3);
    assert_eq!(next(spec, date(2026, 4, 10)), date(2026, 6, 10));
    assert_eq!(next(spec, date(2026, 1, 5)), date(2026, 3, 5));
}

#[test]
fn quarterly_anchor_month_itself_is_skipped() {
    let spec = RecurrenceSpec::new(Frequency::Quarterly).with_month_of_year(3);
    assert_eq!(next(spec, date(2026, 3, 15)), date(2026, 6, 15));
}

#[test]
fn quarterly_anchor_wraps_to_next_year() {
    let spec = RecurrenceSpec::new(Frequency::Quarterly).with_month_of_year(3);
    assert_eq!(next(spec, date(2026, 12, 15)), date(2027, 3, 15));
}

#[test]
fn quarterly_anchor_late_in_year_wraps_candidates() {
    // Anchor 11 => Nov / Feb / May / Aug.
    let spec = RecurrenceSpec::new(Frequency::Quarterly).with_month_of_year(11);
    assert_eq!(next(spec, date(2026, 1, 20)), date(2026, 2, 20));
    assert_eq!(next(spec, date(2026, 11, 20)), date(2027, 2, 20));
}

#[test]
fn quarterly_anchor_clamps_day_of_month() {
    let spec = RecurrenceSpec::new(Frequency::Quarterly)
        .with_month_of_year(3)
        .with_day_of_month(31);
    assert_eq!(next(spec, date(2026, 7, 1)), date(2026, 9, 30));
    assert_eq!(next(spec, date(2026, 10, 1)), date(2026, 12, 31));
}

#[test]
fn semi_annual_anchor_two_candidates() {
    // Anchor 1 => Jan / Jul.
    let spec = RecurrenceSpec::new(Frequency::SemiAnnually).with_month_of_year(1);
    assert_eq!(next(spec, date(2026, 3, 5)), date(2026, 7, 5));
    assert_eq!(next(spec, date(2026, 7, 20)), date(2027, 1, 20));
}

#[test]
fn semi_annual_anchor_with_day_clamp() {
    // Anchor 8 => Aug / Feb.
    let spec = RecurrenceSpec::new(Frequency::SemiAnnually)
        .with_month_of_year(8)
        .with_day_of_month(30);
    assert_eq!(next(spec, date(2026, 1, 10)), date(2026, 2, 28));
    assert_eq!(next(spec, date(2028, 1, 10)), date(2028, 2, 29));
}

#[test]
fn semi_annual_without_anchor_adds_six_months() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::SemiAnnually), date(2026, 8, 31)), date(2027, 2, 28));
}

// -- annually -----------------------------------------------------------------

#[test]
fn annual_adds_one_year() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Annually), date(2026, 5, 10)), date(2027, 5, 10));
}

#[test]
fn annual_from_leap_day_clamps() {
    assert_eq!(next(RecurrenceSpec::new(Frequency::Annually), date(2028, 2, 29)), date(2029, 2, 28));
}

#[test]
fn annual_anchor_month_and_day() {
    let spec = RecurrenceSpec::new(Frequency::Annually)
        .with_month_of_year(2)
        .with_day_of_month(30);
    assert_eq!(next(spec, date(2026, 5, 10)), date(2027, 2, 28));

    let spec = RecurrenceSpec::new(Frequency::Annually).with_month_of_year(9);
    assert_eq!(next(spec, date(2026, 1, 31)), date(2027, 9, 30));
}

// -- properties -----------------------------------------------------------------

fn sample_specs() -> Vec<RecurrenceSpec> {
    let mut specs = Vec::new();
    for freq in Frequency::ALL {
        specs.push(RecurrenceSpec::new(freq));
        if freq.uses_day_of_week() {
            for dow in 0..=6 {
                specs.push(RecurrenceSpec::new(freq).with_day_of_week(dow));
            }
        }
        if freq.uses_day_of_month() {
            for dom in [1, 15, 28, 29, 30, 31] {
                specs.push(RecurrenceSpec::new(freq).with_day_of_month(dom));
            }
        }
        if freq.uses_month_of_year() {
            for moy in 1..=12 {
                specs.push(RecurrenceSpec::new(freq).with_month_of_year(moy));
                specs.push(RecurrenceSpec::new(freq).with_month_of_year(moy).with_day_of_month(31));
            }
        }
    }
    specs
}

#[test]
fn every_result_is_strictly_after_reference() {
    let specs = sample_specs();
    let mut reference = date(2027, 1, 1);
    let end = date(2029, 1, 1);
    while reference < end {
        for spec in &specs {
            let due = compute_next_due_date(spec, reference);
            assert!(due > reference, "{:?} from {} gave {}", spec, reference, due);
        }
        reference = reference.succ_opt().unwrap();
    }
}

#[test]
fn requested_day_never_rolls_into_next_month() {
    let spec = RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(31);
    let mut reference = date(2026, 1, 1);
    for _ in 0..24 {
        let due = compute_next_due_date(&spec, reference);
        let expected_month = reference.month() % 12 + 1;
        assert_eq!(due.month(), expected_month);
        assert_eq!(Some(due.day()), days_in_month(due.year(), due.month()));
        reference = due;
    }
}

#[test]
fn identical_inputs_give_identical_output() {
    let spec = RecurrenceSpec::new(Frequency::Quarterly)
        .with_month_of_year(2)
        .with_day_of_month(31);
    let reference = date(2026, 6, 17);
    assert_eq!(
        compute_next_due_date(&spec, reference),
        compute_next_due_date(&spec, reference)
    );
}

#[test]
fn preview_chains_occurrences() {
    let spec = RecurrenceSpec::new(Frequency::Quarterly).with_month_of_year(3);
    assert_eq!(
        preview_occurrences(&spec, date(2026, 8, 1), 4),
        vec![date(2026, 9, 1), date(2026, 12, 1), date(2027, 3, 1), date(2027, 6, 1)]
    );
    assert!(preview_occurrences(&spec, date(2026, 8, 1), 0).is_empty());
}

// -- calendar helpers -------------------------------------------------------------

#[test]
fn month_lengths() {
    assert_eq!(days_in_month(2026, 2), Some(28));
    assert_eq!(days_in_month(2028, 2), Some(29));
    assert_eq!(days_in_month(2100, 2), Some(28));
    assert_eq!(days_in_month(2000, 2), Some(29));
    assert_eq!(days_in_month(2026, 12), Some(31));
    assert_eq!(days_in_month(2026, 13), None);
    assert_eq!(days_in_month(2026, 0), None);
}

#[test]
fn clamp_day_reduces_to_last_day() {
    assert_eq!(clamp_day(2026, 4, 31), Some(date(2026, 4, 30)));
    assert_eq!(clamp_day(2026, 4, 12), Some(date(2026, 4, 12)));
}

// -- validation ---------------------------------------------------------------------

fn rejects(spec: RecurrenceSpec) -> bool {
    matches!(spec.validate(), Err(ScheduleError::InvalidRecurrence(_)))
}

#[test]
fn validate_accepts_coherent_specs() {
    for spec in sample_specs() {
        assert!(spec.validate().is_ok(), "{:?}", spec);
    }
}

#[test]
fn validate_rejects_out_of_range_values() {
    assert!(rejects(RecurrenceSpec::new(Frequency::Weekly).with_day_of_week(7)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(0)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Monthly).with_day_of_month(32)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Annually).with_month_of_year(0)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Annually).with_month_of_year(13)));
}

#[test]
fn validate_rejects_fields_the_frequency_ignores() {
    assert!(rejects(RecurrenceSpec::new(Frequency::Monthly).with_day_of_week(1)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Daily).with_day_of_month(1)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Weekly).with_day_of_month(1)));
    assert!(rejects(RecurrenceSpec::new(Frequency::Monthly).with_month_of_year(3)));
}

#[test]
fn frequency_parses_snake_case() {
    assert_eq!("semi_annually".parse::<Frequency>().unwrap(), Frequency::SemiAnnually);
    assert_eq!(Frequency::Biweekly.to_string(), "biweekly");
    assert!("fortnightly".parse::<Frequency>().is_err());
    assert_eq!(
        serde_json::to_string(&Frequency::SemiAnnually).unwrap(),
        "\"semi_annually\""
    );
}
