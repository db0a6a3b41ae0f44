//! Occurrence expansion: turning a recurrence rule into the concrete
//! calendar dates a dose is due within a window.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::models::RecurrenceRule;

/// A single concrete due-date instance of a medication. Derived from a
/// rule, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Occurrence {
    pub medication_id: Uuid,
    pub due_date: NaiveDate,
}

impl Occurrence {
    pub fn new(medication_id: Uuid, due_date: NaiveDate) -> Self {
        Self {
            medication_id,
            due_date,
        }
    }
}

/// Expand `rule` over `[window_start, window_end]` (both inclusive).
///
/// Dates come back ascending and deduplicated; the same inputs always
/// produce the same sequence. Each period of `period_length_days` starting
/// at `start_date` contributes `frequency_per_period` dates at sub-interval
/// boundaries spaced `period / frequency` days apart (floored, minimum one
/// day). Nothing is emitted before `start_date` or past the end of a
/// period, so a rule asking for more doses than the period has days emits
/// at most one dose per day.
pub fn expand(rule: &RecurrenceRule, window_start: NaiveDate, window_end: NaiveDate) -> Vec<NaiveDate> {
    if window_end < window_start || window_end < rule.start_date {
        return Vec::new();
    }

    let period = i64::from(rule.period_length_days);
    let frequency = i64::from(rule.frequency_per_period);
    let spacing = (period / frequency).max(1);
    if rule.is_degraded() {
        tracing::warn!(
            frequency = rule.frequency_per_period,
            period_days = rule.period_length_days,
            "rule requests more doses than its period has days; clamping to one dose per day"
        );
    }

    // Skip whole periods that end before the window opens.
    let lead_days = (window_start - rule.start_date).num_days();
    let mut period_index = if lead_days > 0 { lead_days / period } else { 0 };

    let mut dates = Vec::new();
    loop {
        let period_start = rule.start_date + Duration::days(period_index * period);
        if period_start > window_end {
            break;
        }
        for dose in 0..frequency {
            let offset = dose * spacing;
            if offset >= period {
                break;
            }
            let due = period_start + Duration::days(offset);
            if due > window_end {
                break;
            }
            if due >= window_start {
                dates.push(due);
            }
        }
        period_index += 1;
    }
    dates
}

/// Whether `date` is a due-date of `rule`.
pub fn is_due_on(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    !expand(rule, date, date).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rule(start: &str, frequency: u32, period: u32) -> RecurrenceRule {
        RecurrenceRule::new(date(start), frequency, period, TimeOfDay::Unspecified).unwrap()
    }

    #[test]
    fn weekly_rule_expands_to_period_boundaries() {
        let r = rule("2024-11-01", 1, 7);
        let dates = expand(&r, date("2024-11-01"), date("2024-11-22"));
        assert_eq!(
            dates,
            vec![
                date("2024-11-01"),
                date("2024-11-08"),
                date("2024-11-15"),
                date("2024-11-22"),
            ]
        );
    }

    #[test]
    fn simple_rule_counts_and_spacing() {
        // frequency 1, period P over [start, start + k*P] gives k+1 dates P apart.
        for p in [1u32, 3, 7, 30] {
            let k = 4i64;
            let r = rule("2024-01-10", 1, p);
            let end = r.start_date + Duration::days(k * i64::from(p));
            let dates = expand(&r, r.start_date, end);
            assert_eq!(dates.len() as i64, k + 1);
            assert_eq!(dates[0], r.start_date);
            for pair in dates.windows(2) {
                assert_eq!((pair[1] - pair[0]).num_days(), i64::from(p));
            }
        }
    }

    #[test]
    fn expansion_is_deterministic() {
        let r = rule("2024-11-01", 3, 7);
        let a = expand(&r, date("2024-10-01"), date("2025-01-01"));
        let b = expand(&r, date("2024-10-01"), date("2025-01-01"));
        assert_eq!(a, b);
    }

    #[test]
    fn window_before_start_is_empty() {
        let r = rule("2024-11-01", 1, 7);
        assert!(expand(&r, date("2024-10-01"), date("2024-10-31")).is_empty());
    }

    #[test]
    fn inverted_window_is_empty() {
        let r = rule("2024-11-01", 1, 7);
        assert!(expand(&r, date("2024-11-22"), date("2024-11-01")).is_empty());
    }

    #[test]
    fn never_looks_before_start_date() {
        let r = rule("2024-11-05", 1, 1);
        let dates = expand(&r, date("2024-11-01"), date("2024-11-07"));
        assert_eq!(
            dates,
            vec![date("2024-11-05"), date("2024-11-06"), date("2024-11-07")]
        );
    }

    #[test]
    fn sub_intervals_within_period() {
        // 3 doses over 9 days: spacing floor(9/3) = 3 → offsets 0, 3, 6.
        let r = rule("2024-11-01", 3, 9);
        let dates = expand(&r, date("2024-11-01"), date("2024-11-18"));
        assert_eq!(
            dates,
            vec![
                date("2024-11-01"),
                date("2024-11-04"),
                date("2024-11-07"),
                date("2024-11-10"),
                date("2024-11-13"),
                date("2024-11-16"),
            ]
        );
    }

    #[test]
    fn uneven_division_floors_spacing() {
        // 2 doses over 7 days: spacing floor(7/2) = 3 → offsets 0 and 3.
        let r = rule("2024-11-01", 2, 7);
        let dates = expand(&r, date("2024-11-01"), date("2024-11-14"));
        assert_eq!(
            dates,
            vec![
                date("2024-11-01"),
                date("2024-11-04"),
                date("2024-11-08"),
                date("2024-11-11"),
            ]
        );
    }

    #[test]
    fn degraded_rule_clamps_to_one_dose_per_day() {
        // 5 doses in a 2-day period: spacing clamps to 1, at most 2 emitted.
        let r = rule("2024-11-01", 5, 2);
        let dates = expand(&r, date("2024-11-01"), date("2024-11-04"));
        assert_eq!(
            dates,
            vec![
                date("2024-11-01"),
                date("2024-11-02"),
                date("2024-11-03"),
                date("2024-11-04"),
            ]
        );
    }

    #[test]
    fn window_clips_inside_periods() {
        let r = rule("2024-11-01", 1, 7);
        // Window opens mid-period and closes mid-period.
        let dates = expand(&r, date("2024-11-02"), date("2024-11-20"));
        assert_eq!(dates, vec![date("2024-11-08"), date("2024-11-15")]);
    }

    #[test]
    fn far_future_window_skips_ahead() {
        let r = rule("2020-01-01", 1, 7);
        let dates = expand(&r, date("2030-01-01"), date("2030-01-31"));
        assert_eq!(dates.len(), 5);
        for d in &dates {
            let since_start = (*d - r.start_date).num_days();
            assert_eq!(since_start % 7, 0);
        }
    }

    #[test]
    fn is_due_on_matches_expansion() {
        let r = rule("2024-11-01", 1, 7);
        assert!(is_due_on(&r, date("2024-11-01")));
        assert!(is_due_on(&r, date("2024-11-08")));
        assert!(!is_due_on(&r, date("2024-11-09")));
        assert!(!is_due_on(&r, date("2024-10-31")));
    }

    #[test]
    fn occurrence_equality_is_fieldwise() {
        let id = Uuid::new_v4();
        let a = Occurrence::new(id, date("2024-11-14"));
        let b = Occurrence::new(id, date("2024-11-14"));
        assert_eq!(a, b);
        assert_ne!(a, Occurrence::new(id, date("2024-11-15")));
        assert_ne!(a, Occurrence::new(Uuid::new_v4(), date("2024-11-14")));
    }
}
