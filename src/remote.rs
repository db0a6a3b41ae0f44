//! Read-only remote medication source.
//!
//! Fetches dispensed medications for a patient from a FHIR-flavored
//! endpoint (`{base}/MedicationDispense/?patient={id}`) and maps each
//! bundle entry into the local `Medication` shape. One GET per call; a
//! failure is terminal for that call and never retried silently.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{parse_start_date, Medication, MedicationType, RecurrenceRule, TimeOfDay};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("response body undecodable: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch and map every dispense entry for `patient_id`. Entries
    /// without a usable name or start date are skipped with a warning.
    pub async fn fetch_for_patient(&self, patient_id: &str) -> Result<Vec<Medication>, RemoteError> {
        let url = format!(
            "{}/MedicationDispense/?patient={patient_id}",
            self.base_url.trim_end_matches('/'),
        );
        tracing::debug!(%url, "fetching remote medications");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }
        let body = response.text().await?;
        let bundle: DispenseBundle = serde_json::from_str(&body)?;

        Ok(map_bundle(bundle))
    }
}

// ---------------------------------------------------------------------------
// Wire types: the subset of the bundle the mapping reads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DispenseBundle {
    #[serde(default)]
    entry: Vec<DispenseEntry>,
}

#[derive(Debug, Deserialize)]
struct DispenseEntry {
    resource: DispenseResource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispenseResource {
    #[serde(default)]
    id: Option<String>,
    medication_codeable_concept: Option<CodeableConcept>,
    quantity: Option<Quantity>,
    #[serde(default)]
    dosage_instruction: Vec<DosageInstruction>,
}

#[derive(Debug, Deserialize)]
struct CodeableConcept {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    value: Option<f64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DosageInstruction {
    dose_quantity: Option<Quantity>,
    timing: Option<Timing>,
}

#[derive(Debug, Deserialize)]
struct Timing {
    repeat: Option<Repeat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repeat {
    frequency: Option<u32>,
    period: Option<f64>,
    period_units: Option<String>,
    bounds_period: Option<BoundsPeriod>,
}

#[derive(Debug, Deserialize)]
struct BoundsPeriod {
    start: Option<String>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn map_bundle(bundle: DispenseBundle) -> Vec<Medication> {
    bundle
        .entry
        .into_iter()
        .filter_map(|entry| map_resource(entry.resource))
        .collect()
}

fn map_resource(resource: DispenseResource) -> Option<Medication> {
    let resource_id = resource.id.unwrap_or_default();

    let name = resource
        .medication_codeable_concept
        .and_then(|c| c.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let Some(name) = name else {
        tracing::warn!(%resource_id, "skipping dispense entry without a medication name");
        return None;
    };

    let instruction = resource.dosage_instruction.into_iter().next();
    let repeat = instruction
        .as_ref()
        .and_then(|i| i.timing.as_ref())
        .and_then(|t| t.repeat.as_ref());

    let start = repeat
        .and_then(|r| r.bounds_period.as_ref())
        .and_then(|b| b.start.as_deref())
        .and_then(parse_date_prefix);
    let Some(start_date) = start else {
        tracing::warn!(%resource_id, %name, "skipping dispense entry without a start date");
        return None;
    };

    let frequency = repeat.and_then(|r| r.frequency).unwrap_or(1);
    let period = repeat.and_then(|r| r.period).unwrap_or(1.0);
    let unit = repeat.and_then(|r| r.period_units.as_deref()).unwrap_or("d");
    let period_days = ((period * period_unit_days(unit)).round() as u32).max(1);

    let rule = match RecurrenceRule::new(start_date, frequency, period_days, TimeOfDay::Unspecified)
    {
        Ok(rule) => rule,
        Err(error) => {
            tracing::warn!(%resource_id, %name, %error, "skipping dispense entry with invalid timing");
            return None;
        }
    };

    let pack_size = resource
        .quantity
        .and_then(|q| q.value)
        .map(|v| v.max(0.0) as u32)
        .unwrap_or(0);

    // The domain model has no dose field; keep the dispensed dose visible
    // in the notes.
    let notes = instruction
        .and_then(|i| i.dose_quantity)
        .and_then(|dose| {
            let value = dose.value?;
            Some(match dose.unit {
                Some(unit) => format!("Dose: {value} {unit}"),
                None => format!("Dose: {value}"),
            })
        })
        .unwrap_or_default();

    Some(Medication {
        id: Uuid::new_v4(),
        name,
        kind: MedicationType::Pill,
        pack_size,
        notes,
        rule,
    })
}

/// Bundle timestamps may be full datetimes; the date is the first ten
/// characters either way.
fn parse_date_prefix(raw: &str) -> Option<chrono::NaiveDate> {
    let prefix = raw.get(..10).unwrap_or(raw);
    parse_start_date(prefix).ok()
}

/// Day-multiplier for the repeat's period unit; unknown units read as days.
fn period_unit_days(unit: &str) -> f64 {
    match unit {
        "d" => 1.0,
        "wk" => 7.0,
        "mo" => 30.0,
        other => {
            tracing::warn!(unit = other, "unknown period unit; treating as days");
            1.0
        }
    }
}
