use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::telemetry::UnitRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// What a mutation wants done with the row it was shown.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Create the row. Applies only if no row exists.
    Insert(UnitRecord),
    /// Replace the row. Applies only if a row exists.
    Update(UnitRecord),
    /// Leave the row as it is.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Keep,
}

impl Write {
    pub fn kind(&self) -> WriteKind {
        match self {
            Write::Insert(_) => WriteKind::Insert,
            Write::Update(_) => WriteKind::Update,
            Write::Keep => WriteKind::Keep,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: WriteKind,
    /// The row as stored afterwards; `None` if the write affected no row.
    pub record: Option<UnitRecord>,
}

pub type Mutation<'a> = &'a (dyn Fn(Option<&UnitRecord>) -> Write + Send + Sync);

/// Keyed record store for unit state.
#[async_trait]
pub trait UnitStore: Send + Sync {
    async fn fetch(&self, mac: &str) -> Result<Option<UnitRecord>, StoreError>;

    /// All records, ordered by identifier.
    async fn list(&self) -> Result<Vec<UnitRecord>, StoreError>;

    /// Looks up the row for `mac`, hands it to `mutation` and applies the
    /// returned write as one atomic step: no other `modify` for the same store
    /// interleaves between the lookup and the write.
    async fn modify(&self, mac: &str, mutation: Mutation<'_>) -> Result<Outcome, StoreError>;
}

/// The row a write leaves behind, or `None` if the write does not apply to
/// the current row.
pub(crate) fn resolve(existing: Option<&UnitRecord>, write: Write) -> Option<UnitRecord> {
    match (write, existing) {
        (Write::Insert(record), None) | (Write::Update(record), Some(_)) => Some(record),
        (Write::Keep, existing) => existing.cloned(),
        (write, _) => {
            log::warn!("Discarding {:?} write: row state changed", write.kind());
            None
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    units: RwLock<HashMap<String, UnitRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitStore for MemoryStore {
    async fn fetch(&self, mac: &str) -> Result<Option<UnitRecord>, StoreError> {
        Ok(self.units.read().await.get(mac).cloned())
    }

    async fn list(&self) -> Result<Vec<UnitRecord>, StoreError> {
        let mut records: Vec<UnitRecord> = self.units.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.mac.cmp(&b.mac));
        Ok(records)
    }

    async fn modify(&self, mac: &str, mutation: Mutation<'_>) -> Result<Outcome, StoreError> {
        let mut units = self.units.write().await;
        let write = mutation(units.get(mac));
        let kind = write.kind();
        let record = resolve(units.get(mac), write);
        if let (Some(row), WriteKind::Insert | WriteKind::Update) = (&record, kind) {
            units.insert(mac.to_string(), row.clone());
        }
        Ok(Outcome { kind, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_update() {
        let store = MemoryStore::new();
        assert!(store.fetch("AA").await.unwrap().is_none());

        let outcome = store
            .modify("AA", &|_| Write::Insert(UnitRecord::new("AA")))
            .await
            .unwrap();
        assert_eq!(outcome.kind, WriteKind::Insert);
        assert_eq!(outcome.record, Some(UnitRecord::new("AA")));

        let outcome = store
            .modify("AA", &|existing| {
                let mut record = existing.cloned().unwrap();
                record.fields.status_string = Some("OK".into());
                Write::Update(record)
            })
            .await
            .unwrap();
        assert_eq!(
            outcome.record.unwrap().fields.status_string.as_deref(),
            Some("OK")
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mismatched_write_affects_no_row() {
        let store = MemoryStore::new();

        let outcome = store
            .modify("AA", &|_| Write::Update(UnitRecord::new("AA")))
            .await
            .unwrap();
        assert_eq!(outcome.record, None);
        assert!(store.fetch("AA").await.unwrap().is_none());

        let outcome = store.modify("AA", &|_| Write::Keep).await.unwrap();
        assert_eq!(outcome.record, None);
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let store = MemoryStore::new();
        for mac in ["CC", "AA", "BB"] {
            store
                .modify(mac, &|_| Write::Insert(UnitRecord::new(mac)))
                .await
                .unwrap();
        }
        let macs: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.mac)
            .collect();
        assert_eq!(macs, vec!["AA", "BB", "CC"]);
    }
}
