pub mod enums;
pub mod medication;
pub mod recurrence;

pub use enums::{InvalidEnumValue, MedicationType, TimeOfDay};
pub use medication::{Medication, MedicationInput, MedicationPatch, StoredMedication};
pub use recurrence::{parse_start_date, RecurrenceRule, RuleError};
