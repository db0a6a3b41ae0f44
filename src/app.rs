//! Composition root: one shared core owning the session, the catalog and
//! the adherence log, all over a single injected blob store.
//!
//! This is the surface the screens call. Cross-component invariants live
//! here: deleting a medication cascades into the adherence log, and a
//! dose can only be marked taken on a date its current rule actually
//! schedules.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::{CatalogError, MedicationCatalog};
use crate::models::{Medication, MedicationInput, MedicationPatch};
use crate::remote::{RemoteError, RemoteSource};
use crate::schedule::{self, expander, AdherenceLog, DueMedication};
use crate::session::{SessionHolder, UserSession};
use crate::store::{BlobStore, StoreError};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("no active user session")]
    NoActiveSession,

    #[error("medication {medication_id} is not scheduled on {date}")]
    NotScheduled {
        medication_id: Uuid,
        date: NaiveDate,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

pub struct AppCore {
    session: SessionHolder,
    catalog: MedicationCatalog,
    adherence: Mutex<AdherenceLog>,
}

impl AppCore {
    pub async fn new(store: Arc<dyn BlobStore>) -> Self {
        let adherence = AdherenceLog::load(store.clone()).await;
        Self {
            session: SessionHolder::new(),
            catalog: MedicationCatalog::new(store),
            adherence: Mutex::new(adherence),
        }
    }

    // ── Session ─────────────────────────────────────────────

    pub async fn login(&self, id: impl Into<String>, name: impl Into<String>) -> UserSession {
        self.session.login(id, name).await
    }

    pub async fn logout(&self) -> bool {
        self.session.logout().await
    }

    pub async fn current_user(&self) -> Option<UserSession> {
        self.session.current().await
    }

    // ── Catalog ─────────────────────────────────────────────

    pub async fn medications(&self) -> Vec<Medication> {
        self.catalog.list().await
    }

    pub async fn add_medication(&self, input: MedicationInput) -> Result<Medication, CoreError> {
        Ok(self.catalog.add(input).await?)
    }

    pub async fn update_medication(
        &self,
        id: Uuid,
        patch: MedicationPatch,
    ) -> Result<Medication, CoreError> {
        Ok(self.catalog.update(id, patch).await?)
    }

    /// Delete a medication and every adherence record it owns.
    pub async fn remove_medication(&self, id: Uuid) -> Result<Medication, CoreError> {
        let removed = self.catalog.remove(id).await?;
        self.adherence.lock().await.remove_medication(id).await?;
        Ok(removed)
    }

    // ── Adherence ───────────────────────────────────────────

    /// Mark a dose taken. The date must be a due-date under the
    /// medication's current rule; anything else would create a record no
    /// projection could ever count.
    pub async fn mark_taken(&self, id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        let medication = self
            .catalog
            .get(id)
            .await
            .ok_or(CatalogError::NotFound(id))?;
        if !expander::is_due_on(&medication.rule, date) {
            return Err(CoreError::NotScheduled {
                medication_id: id,
                date,
            });
        }
        self.adherence.lock().await.mark_taken(id, date).await?;
        Ok(())
    }

    /// Clear a taken mark. Total: clearing an absent or orphaned record
    /// is a no-op.
    pub async fn mark_untaken(&self, id: Uuid, date: NaiveDate) -> Result<(), CoreError> {
        self.adherence.lock().await.mark_untaken(id, date).await?;
        Ok(())
    }

    pub async fn is_taken(&self, id: Uuid, date: NaiveDate) -> bool {
        self.adherence.lock().await.is_taken(id, date)
    }

    // ── Projections ─────────────────────────────────────────

    pub async fn due_on(&self, date: NaiveDate) -> Vec<DueMedication> {
        let medications = self.catalog.list().await;
        let log = self.adherence.lock().await;
        schedule::due_on(&medications, &log, date)
    }

    pub async fn adherence_ratio(&self, date: NaiveDate) -> f64 {
        let medications = self.catalog.list().await;
        let log = self.adherence.lock().await;
        schedule::adherence_ratio(&medications, &log, date)
    }

    // ── Remote ──────────────────────────────────────────────

    /// Fetch the dispensed-medication list for the logged-in patient.
    /// Read-only: nothing is merged into the catalog.
    pub async fn fetch_remote_medications(
        &self,
        source: &RemoteSource,
    ) -> Result<Vec<Medication>, CoreError> {
        let session = self
            .session
            .current()
            .await
            .ok_or(CoreError::NoActiveSession)?;
        Ok(source.fetch_for_patient(&session.id).await?)
    }
}
