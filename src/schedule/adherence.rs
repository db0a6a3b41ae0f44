//! Per-dose adherence: which (medication, due-date) pairs were marked
//! taken, and when.
//!
//! The log owns its records independently of the catalog and references
//! medications by id only, so records for a deleted or re-ruled medication
//! are tolerated as orphans and simply never counted against the current
//! schedule.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ADHERENCE_KEY;
use crate::store::{BlobStore, StoreError};

use super::expander::Occurrence;

/// One persisted adherence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceRecord {
    #[serde(rename = "medicationId")]
    pub medication_id: Uuid,
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
    pub taken: bool,
    #[serde(rename = "markedAt")]
    pub marked_at: Option<DateTime<Utc>>,
}

/// In-memory adherence state, written through to the blob store under the
/// `"adherence"` key on every mutation.
pub struct AdherenceLog {
    store: Arc<dyn BlobStore>,
    records: HashMap<(Uuid, NaiveDate), AdherenceRecord>,
}

impl AdherenceLog {
    /// Load the log from the store. Read failures and undecodable payloads
    /// are treated as "no data".
    pub async fn load(store: Arc<dyn BlobStore>) -> Self {
        let records = match store.get(ADHERENCE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<AdherenceRecord>>(&raw) {
                Ok(list) => list
                    .into_iter()
                    .map(|r| ((r.medication_id, r.due_date), r))
                    .collect(),
                Err(error) => {
                    tracing::warn!(%error, "adherence data undecodable; starting empty");
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(error) => {
                tracing::warn!(%error, "adherence read failed; starting empty");
                HashMap::new()
            }
        };
        Self { store, records }
    }

    /// Record a dose as taken, stamped with the current time. Idempotent:
    /// a dose already marked taken keeps its original timestamp and no
    /// write is issued.
    pub async fn mark_taken(
        &mut self,
        medication_id: Uuid,
        due_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let key = (medication_id, due_date);
        if self.records.get(&key).is_some_and(|r| r.taken) {
            return Ok(false);
        }
        self.records.insert(
            key,
            AdherenceRecord {
                medication_id,
                due_date,
                taken: true,
                marked_at: Some(Utc::now()),
            },
        );
        self.persist().await?;
        tracing::info!(%medication_id, %due_date, "dose marked taken");
        Ok(true)
    }

    /// Forget a taken mark. Idempotent: absent records are a no-op.
    pub async fn mark_untaken(
        &mut self,
        medication_id: Uuid,
        due_date: NaiveDate,
    ) -> Result<bool, StoreError> {
        if self.records.remove(&(medication_id, due_date)).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        tracing::info!(%medication_id, %due_date, "dose marked untaken");
        Ok(true)
    }

    /// Absent records default to not-taken.
    pub fn is_taken(&self, medication_id: Uuid, due_date: NaiveDate) -> bool {
        self.records
            .get(&(medication_id, due_date))
            .is_some_and(|r| r.taken)
    }

    /// How many of the given occurrences are marked taken.
    pub fn count_taken(&self, occurrences: &[Occurrence]) -> usize {
        occurrences
            .iter()
            .filter(|o| self.is_taken(o.medication_id, o.due_date))
            .count()
    }

    /// Drop every record for a medication. Called when the catalog deletes
    /// the owning entry; returns how many records went away.
    pub async fn remove_medication(&mut self, medication_id: Uuid) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records.retain(|(id, _), _| *id != medication_id);
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist().await?;
            tracing::info!(%medication_id, removed, "adherence records cascade-deleted");
        }
        Ok(removed)
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let mut list: Vec<&AdherenceRecord> = self.records.values().collect();
        list.sort_by_key(|r| (r.medication_id, r.due_date));
        let raw = serde_json::to_string(&list)?;
        self.store.set(ADHERENCE_KEY, raw).await
    }
}
