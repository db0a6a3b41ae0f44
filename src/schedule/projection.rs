//! The two queries the schedule screens need: what is due on a date, and
//! what share of it was taken.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Medication;

use super::adherence::AdherenceLog;
use super::expander::{self, Occurrence};

/// One row of the "due on date D" view.
#[derive(Debug, Clone, Serialize)]
pub struct DueMedication {
    pub medication: Medication,
    pub occurrence: Occurrence,
    pub taken: bool,
}

/// Every medication due on `date`, with its current taken state.
pub fn due_on(medications: &[Medication], log: &AdherenceLog, date: NaiveDate) -> Vec<DueMedication> {
    medications
        .iter()
        .filter(|med| expander::is_due_on(&med.rule, date))
        .map(|med| {
            let occurrence = Occurrence::new(med.id, date);
            DueMedication {
                taken: log.is_taken(occurrence.medication_id, occurrence.due_date),
                medication: med.clone(),
                occurrence,
            }
        })
        .collect()
}

/// Taken doses over due doses for `date`, in `[0, 1]`.
///
/// A date with nothing due reports 0, not NaN; the progress ring renders
/// the quotient directly.
pub fn adherence_ratio(medications: &[Medication], log: &AdherenceLog, date: NaiveDate) -> f64 {
    let due = due_on(medications, log, date);
    if due.is_empty() {
        return 0.0;
    }
    let taken = due.iter().filter(|d| d.taken).count();
    taken as f64 / due.len() as f64
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::models::{MedicationType, RecurrenceRule, TimeOfDay};
    use crate::store::MemoryStore;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn med(name: &str, start: &str, frequency: u32, period: u32) -> Medication {
        Medication {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: MedicationType::Pill,
            pack_size: 30,
            notes: String::new(),
            rule: RecurrenceRule::new(date(start), frequency, period, TimeOfDay::Unspecified)
                .unwrap(),
        }
    }

    async fn empty_log() -> AdherenceLog {
        AdherenceLog::load(Arc::new(MemoryStore::new())).await
    }

    #[tokio::test]
    async fn due_on_filters_by_rule_membership() {
        let weekly = med("Weekly", "2024-11-01", 1, 7);
        let daily = med("Daily", "2024-11-10", 1, 1);
        let meds = vec![weekly.clone(), daily.clone()];
        let log = empty_log().await;

        let due = due_on(&meds, &log, date("2024-11-08"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].medication.id, weekly.id);
        assert_eq!(due[0].occurrence.due_date, date("2024-11-08"));
        assert!(!due[0].taken);

        let due = due_on(&meds, &log, date("2024-11-15"));
        let ids: Vec<Uuid> = due.iter().map(|d| d.medication.id).collect();
        assert!(ids.contains(&weekly.id));
        assert!(ids.contains(&daily.id));
    }

    #[tokio::test]
    async fn due_on_reflects_taken_state() {
        let m = med("Daily", "2024-11-01", 1, 1);
        let meds = vec![m.clone()];
        let mut log = empty_log().await;
        log.mark_taken(m.id, date("2024-11-14")).await.unwrap();

        let due = due_on(&meds, &log, date("2024-11-14"));
        assert!(due[0].taken);
        let due = due_on(&meds, &log, date("2024-11-15"));
        assert!(!due[0].taken);
    }

    #[tokio::test]
    async fn ratio_is_half_when_one_of_two_taken() {
        let a = med("A", "2024-11-14", 1, 1);
        let b = med("B", "2024-11-14", 1, 1);
        let meds = vec![a.clone(), b.clone()];
        let mut log = empty_log().await;
        log.mark_taken(a.id, date("2024-11-14")).await.unwrap();

        assert_eq!(adherence_ratio(&meds, &log, date("2024-11-14")), 0.5);
    }

    #[tokio::test]
    async fn ratio_is_zero_not_nan_when_nothing_due() {
        let m = med("Weekly", "2024-11-01", 1, 7);
        let log = empty_log().await;
        let ratio = adherence_ratio(&[m], &log, date("2024-11-02"));
        assert_eq!(ratio, 0.0);
        assert!(!ratio.is_nan());

        let ratio = adherence_ratio(&[], &log, date("2024-11-02"));
        assert_eq!(ratio, 0.0);
    }

    #[tokio::test]
    async fn stale_marks_do_not_count_after_rule_change() {
        let mut m = med("Shifted", "2024-11-14", 1, 7);
        let meds = vec![m.clone()];
        let mut log = empty_log().await;
        log.mark_taken(m.id, date("2024-11-14")).await.unwrap();
        assert_eq!(adherence_ratio(&meds, &log, date("2024-11-14")), 1.0);

        // Rule edited so the 14th is no longer a due-date: the old record
        // is orphaned and the aggregate for that day goes back to 0.
        m.rule = RecurrenceRule::new(date("2024-11-15"), 1, 7, TimeOfDay::Unspecified).unwrap();
        let meds = vec![m];
        assert!(due_on(&meds, &log, date("2024-11-14")).is_empty());
        assert_eq!(adherence_ratio(&meds, &log, date("2024-11-14")), 0.0);
    }
}
