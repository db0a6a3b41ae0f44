//! Recurrence rules: how often and when a medication is taken.
//!
//! A rule generates `frequency_per_period` due-dates within each
//! successive period of `period_length_days` days, starting at
//! `start_date`. Expansion into concrete dates lives in
//! `schedule::expander`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enums::TimeOfDay;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("frequency per period must be at least 1")]
    ZeroFrequency,

    #[error("period length must be at least 1 day")]
    ZeroPeriod,

    #[error("invalid start date: {0}")]
    InvalidStartDate(String),
}

/// How often a medication recurs, anchored at its first possible due-date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// First possible due-date. The expander never looks before it.
    pub start_date: NaiveDate,
    /// Doses within one period. May exceed the period length (degraded,
    /// clamped to one dose per day), but never zero.
    pub frequency_per_period: u32,
    /// Length of the repeating period in days, at least 1.
    pub period_length_days: u32,
    pub time_of_day: TimeOfDay,
}

impl RecurrenceRule {
    pub fn new(
        start_date: NaiveDate,
        frequency_per_period: u32,
        period_length_days: u32,
        time_of_day: TimeOfDay,
    ) -> Result<Self, RuleError> {
        let rule = Self {
            start_date,
            frequency_per_period,
            period_length_days,
            time_of_day,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// One dose every day from `start_date` on.
    pub fn once_daily(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            frequency_per_period: 1,
            period_length_days: 1,
            time_of_day: TimeOfDay::Unspecified,
        }
    }

    /// Re-check the constructor invariants. Used when a rule arrives via
    /// deserialization instead of `new`.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.frequency_per_period < 1 {
            return Err(RuleError::ZeroFrequency);
        }
        if self.period_length_days < 1 {
            return Err(RuleError::ZeroPeriod);
        }
        Ok(())
    }

    /// More doses requested than days in the period. Such a rule is still
    /// legal but expansion clamps it to one dose per day.
    pub fn is_degraded(&self) -> bool {
        self.frequency_per_period > self.period_length_days
    }
}

/// Parse a `YYYY-MM-DD` start date from user or remote input.
pub fn parse_start_date(input: &str) -> Result<NaiveDate, RuleError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| RuleError::InvalidStartDate(input.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn valid_rule_constructs() {
        let rule =
            RecurrenceRule::new(date("2024-11-01"), 1, 7, TimeOfDay::Morning).unwrap();
        assert_eq!(rule.frequency_per_period, 1);
        assert_eq!(rule.period_length_days, 7);
        assert!(!rule.is_degraded());
    }

    #[test]
    fn zero_frequency_rejected() {
        let err = RecurrenceRule::new(date("2024-11-01"), 0, 7, TimeOfDay::Unspecified)
            .unwrap_err();
        assert_eq!(err, RuleError::ZeroFrequency);
    }

    #[test]
    fn zero_period_rejected() {
        let err = RecurrenceRule::new(date("2024-11-01"), 1, 0, TimeOfDay::Unspecified)
            .unwrap_err();
        assert_eq!(err, RuleError::ZeroPeriod);
    }

    #[test]
    fn multiple_doses_per_day_are_legal() {
        // 3 doses in a single day: legal, just degraded past 1/day.
        let rule =
            RecurrenceRule::new(date("2024-11-01"), 3, 1, TimeOfDay::Unspecified).unwrap();
        assert!(rule.is_degraded());

        // 3 doses over 7 days: fine.
        let rule =
            RecurrenceRule::new(date("2024-11-01"), 3, 7, TimeOfDay::Unspecified).unwrap();
        assert!(!rule.is_degraded());
    }

    #[test]
    fn once_daily_shorthand() {
        let rule = RecurrenceRule::once_daily(date("2024-11-01"));
        assert_eq!(rule.frequency_per_period, 1);
        assert_eq!(rule.period_length_days, 1);
        rule.validate().unwrap();
    }

    #[test]
    fn start_date_parsing() {
        assert_eq!(parse_start_date("2024-11-01").unwrap(), date("2024-11-01"));
        assert_eq!(parse_start_date(" 2024-11-01 ").unwrap(), date("2024-11-01"));
        assert!(matches!(
            parse_start_date("01/11/2024"),
            Err(RuleError::InvalidStartDate(_))
        ));
        assert!(parse_start_date("2024-13-40").is_err());
    }
}
