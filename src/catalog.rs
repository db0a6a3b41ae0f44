//! Medication catalog: CRUD over the user's registered medications.
//!
//! The whole collection lives as one JSON array under the
//! `"medications"` key of the blob store, so every mutation is a named
//! read-modify-write cycle through `MedicationRepository`.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::config::MEDICATIONS_KEY;
use crate::models::{
    Medication, MedicationInput, MedicationPatch, MedicationType, RecurrenceRule, RuleError,
    StoredMedication,
};
use crate::store::{BlobStore, StoreError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("medication name must not be empty")]
    EmptyName,

    #[error("a medication named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("medication not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Load-all/save-all access to the stored medication array.
///
/// The store has no per-key API below the blob level, so this is the
/// single place the full-collection read-modify-write lives; making the
/// cycle transactional later only touches this type.
pub struct MedicationRepository {
    store: Arc<dyn BlobStore>,
}

impl MedicationRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Read the whole collection. A failed read or an undecodable payload
    /// is "no data"; individual records with invalid recurrence fields
    /// are skipped, never defaulted into a degraded rule.
    pub async fn load_all(&self) -> Vec<Medication> {
        let raw = match self.store.get(MEDICATIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "medication read failed; treating as empty");
                return Vec::new();
            }
        };

        let records: Vec<StoredMedication> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(%error, "medication data undecodable; treating as empty");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                match record.into_medication() {
                    Ok(med) => Some(med),
                    Err(error) => {
                        tracing::warn!(%id, %error, "skipping stored medication with invalid rule");
                        None
                    }
                }
            })
            .collect()
    }

    /// Write the whole collection back.
    pub async fn save_all(&self, medications: &[Medication]) -> Result<(), StoreError> {
        let records: Vec<StoredMedication> = medications
            .iter()
            .map(StoredMedication::from_medication)
            .collect();
        let raw = serde_json::to_string(&records)?;
        self.store.set(MEDICATIONS_KEY, raw).await
    }
}

/// The CRUD surface over `Medication` entities.
pub struct MedicationCatalog {
    repo: MedicationRepository,
}

impl MedicationCatalog {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            repo: MedicationRepository::new(store),
        }
    }

    pub async fn list(&self) -> Vec<Medication> {
        self.repo.load_all().await
    }

    pub async fn get(&self, id: Uuid) -> Option<Medication> {
        self.repo.load_all().await.into_iter().find(|m| m.id == id)
    }

    /// Register a medication. The recurrence fields are validated up
    /// front; an invalid rule aborts the creation. Names collide
    /// case-insensitively.
    pub async fn add(&self, input: MedicationInput) -> Result<Medication, CatalogError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }
        let rule = RecurrenceRule::new(
            input.start_date,
            input.frequency_per_period,
            input.period_length_days,
            input.time_of_day,
        )?;

        let mut medications = self.repo.load_all().await;
        if let Some(existing) = medications
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(&name))
        {
            return Err(CatalogError::DuplicateName(existing.name.clone()));
        }

        let medication = Medication {
            id: Uuid::new_v4(),
            pack_size: normalize_pack_size(input.kind, input.pack_size),
            name,
            kind: input.kind,
            notes: input.notes,
            rule,
        };
        medications.push(medication.clone());
        self.repo.save_all(&medications).await?;

        tracing::info!(
            medication_id = %medication.id,
            name = %medication.name,
            "medication added"
        );
        Ok(medication)
    }

    /// Apply a partial edit. Name changes keep the duplicate check; rule
    /// changes are re-validated.
    pub async fn update(
        &self,
        id: Uuid,
        patch: MedicationPatch,
    ) -> Result<Medication, CatalogError> {
        let mut medications = self.repo.load_all().await;

        if let Some(new_name) = patch.name.as_deref() {
            let new_name = new_name.trim();
            if new_name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if let Some(existing) = medications
                .iter()
                .find(|m| m.id != id && m.name.eq_ignore_ascii_case(new_name))
            {
                return Err(CatalogError::DuplicateName(existing.name.clone()));
            }
        }
        if let Some(rule) = &patch.rule {
            rule.validate()?;
        }

        let medication = medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        if let Some(name) = patch.name {
            medication.name = name.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            medication.kind = kind;
        }
        if let Some(notes) = patch.notes {
            medication.notes = notes;
        }
        if let Some(rule) = patch.rule {
            medication.rule = rule;
        }
        if let Some(pack_size) = patch.pack_size {
            medication.pack_size = pack_size;
        }
        medication.pack_size = normalize_pack_size(medication.kind, medication.pack_size);

        let updated = medication.clone();
        self.repo.save_all(&medications).await?;

        tracing::info!(medication_id = %id, "medication updated");
        Ok(updated)
    }

    /// Delete a medication, returning the removed entity. Adherence
    /// cascade happens in the composition root, which owns both sides.
    pub async fn remove(&self, id: Uuid) -> Result<Medication, CatalogError> {
        let mut medications = self.repo.load_all().await;
        let position = medications
            .iter()
            .position(|m| m.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        let removed = medications.remove(position);
        self.repo.save_all(&medications).await?;

        tracing::info!(medication_id = %id, name = %removed.name, "medication removed");
        Ok(removed)
    }
}

/// Pack size only means something for pills; other types carry 0.
fn normalize_pack_size(kind: MedicationType, pack_size: u32) -> u32 {
    match kind {
        MedicationType::Pill => pack_size,
        MedicationType::Liquid | MedicationType::Topical => {
            if pack_size != 0 {
                tracing::debug!(pack_size, "ignoring pack size on non-pill medication");
            }
            0
        }
    }
}
