use log::debug;
use std::sync::Arc;
use thiserror::Error;

use crate::telemetry::{append_position, UnitFields, UnitRecord, UnitUpdate};

use super::store::{StoreError, UnitStore, Write, WriteKind};

#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("unit identifier must not be empty")]
    InvalidUnitId,
    #[error("Failed to create bot with MAC {0}")]
    CreateFailed(String),
    #[error("Failed to update bot with MAC {0}")]
    UpdateFailed(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Decides how a submission changes the stored row for `mac`.
///
/// A submission carrying both `gps_now_x` and `gps_now_y` appends that point
/// to the existing history (empty for a new unit), capped to the most recent
/// entries. Absent fields never overwrite stored ones, and a submission with
/// no fields at all leaves an existing row untouched.
pub fn plan_write(mac: &str, existing: Option<&UnitRecord>, fields: &UnitFields) -> Write {
    let history = fields.position().map(|point| {
        let mut history = existing
            .map(|record| record.historical_positions.clone())
            .unwrap_or_default();
        append_position(&mut history, point);
        history
    });

    match existing {
        None => Write::Insert(UnitRecord {
            fields: fields.clone(),
            historical_positions: history.unwrap_or_default(),
            ..UnitRecord::new(mac)
        }),
        Some(_) if fields.is_empty() => Write::Keep,
        Some(record) => {
            let mut record = record.clone();
            record.fields.merge_from(fields);
            if let Some(history) = history {
                record.historical_positions = history;
            }
            Write::Update(record)
        }
    }
}

#[derive(Clone)]
pub struct UpsertEngine {
    store: Arc<dyn UnitStore>,
}

impl UpsertEngine {
    pub fn new(store: Arc<dyn UnitStore>) -> Self {
        Self { store }
    }

    pub async fn upsert(&self, update: &UnitUpdate) -> Result<UnitRecord, UpsertError> {
        let mac = update.mac.as_str();
        if mac.trim().is_empty() {
            return Err(UpsertError::InvalidUnitId);
        }

        let outcome = self
            .store
            .modify(mac, &|existing| plan_write(mac, existing, &update.fields))
            .await?;

        match (outcome.kind, outcome.record) {
            (kind, Some(record)) => {
                debug!(
                    "{:?} for {} ({} positions in history)",
                    kind,
                    mac,
                    record.historical_positions.len()
                );
                Ok(record)
            }
            (WriteKind::Insert, None) => Err(UpsertError::CreateFailed(mac.to_string())),
            (_, None) => Err(UpsertError::UpdateFailed(mac.to_string())),
        }
    }
}
