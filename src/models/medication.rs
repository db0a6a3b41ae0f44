//! Medication entities: the domain type, the stored wire record, and the
//! add/edit input shapes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{MedicationType, TimeOfDay};
use super::recurrence::{RecurrenceRule, RuleError};

/// A registered medication. Owned by the catalog; the id is assigned at
/// creation and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub kind: MedicationType,
    /// Pills per pack; 0 for non-pill types.
    pub pack_size: u32,
    pub notes: String,
    pub rule: RecurrenceRule,
}

/// The persisted record, one array element under the `"medications"` key.
///
/// Field names match the stored JSON the mobile client wrote. Records
/// predating ids get a fresh one on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMedication {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "medicationName")]
    pub medication_name: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "medicationType")]
    pub medication_type: MedicationType,
    #[serde(rename = "pillsInPack")]
    pub pills_in_pack: u32,
    #[serde(rename = "specialNotes", default)]
    pub special_notes: String,
    #[serde(rename = "takeTime", default)]
    pub take_time: TimeOfDay,
    pub frequency: u32,
    pub period: u32,
}

impl StoredMedication {
    pub fn from_medication(med: &Medication) -> Self {
        Self {
            id: med.id,
            medication_name: med.name.clone(),
            start_date: med.rule.start_date,
            medication_type: med.kind,
            pills_in_pack: med.pack_size,
            special_notes: med.notes.clone(),
            take_time: med.rule.time_of_day,
            frequency: med.rule.frequency_per_period,
            period: med.rule.period_length_days,
        }
    }

    /// Rebuild the domain entity, re-validating the recurrence fields.
    pub fn into_medication(self) -> Result<Medication, RuleError> {
        let rule = RecurrenceRule::new(
            self.start_date,
            self.frequency,
            self.period,
            self.take_time,
        )?;
        Ok(Medication {
            id: self.id,
            name: self.medication_name,
            kind: self.medication_type,
            pack_size: self.pills_in_pack,
            notes: self.special_notes,
            rule,
        })
    }
}

/// Input for registering a medication.
#[derive(Debug, Clone, Deserialize)]
pub struct MedicationInput {
    pub name: String,
    pub kind: MedicationType,
    #[serde(default)]
    pub pack_size: u32,
    #[serde(default)]
    pub notes: String,
    pub start_date: NaiveDate,
    pub frequency_per_period: u32,
    pub period_length_days: u32,
    #[serde(default)]
    pub time_of_day: TimeOfDay,
}

/// Partial edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicationPatch {
    pub name: Option<String>,
    pub kind: Option<MedicationType>,
    pub pack_size: Option<u32>,
    pub notes: Option<String>,
    pub rule: Option<RecurrenceRule>,
}
