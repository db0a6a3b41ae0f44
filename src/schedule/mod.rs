pub mod adherence;
pub mod expander;
pub mod projection;

pub use adherence::{AdherenceLog, AdherenceRecord};
pub use expander::{expand, is_due_on, Occurrence};
pub use projection::{adherence_ratio, due_on, DueMedication};
