//! Medication scheduling and adherence tracking.
//!
//! The catalog owns registered medications and their recurrence rules;
//! the expander turns a rule and a date window into concrete due-dates;
//! the adherence log tracks per-dose taken state; the projections answer
//! the two questions the screens ask ("what is due on D?", "how much of
//! it was taken?"). `AppCore` wires these over one injected blob store.

pub mod app;
pub mod catalog;
pub mod config;
pub mod models;
pub mod reminder;
pub mod remote;
pub mod schedule;
pub mod session;
pub mod store;

pub use app::{AppCore, CoreError};
pub use catalog::{CatalogError, MedicationCatalog, MedicationRepository};
pub use models::{
    Medication, MedicationInput, MedicationPatch, MedicationType, RecurrenceRule, RuleError,
    TimeOfDay,
};
pub use remote::{RemoteError, RemoteSource};
pub use schedule::{AdherenceLog, DueMedication, Occurrence};
pub use session::{SessionHolder, UserSession};
pub use store::{BlobStore, MemoryStore, SqliteStore, StoreError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing once at startup; `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
