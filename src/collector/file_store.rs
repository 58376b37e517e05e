use async_trait::async_trait;
use log::error;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::telemetry::UnitRecord;

use super::store::{resolve, Mutation, Outcome, StoreError, UnitStore, WriteKind};

/// One YAML file per unit under `base`. Modifications are serialised through
/// a single lock; each file is replaced by rename so readers never see a
/// partial record.
pub struct FileStore {
    base: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        FileStore {
            base,
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, mac: &str) -> PathBuf {
        self.base.join(format!("{}.yaml", file_stem(mac)))
    }

    async fn load(&self, path: &Path) -> Result<Option<UnitRecord>, StoreError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_yaml::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &UnitRecord) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.base).await?;

        let path = self.record_path(&record.mac);
        let tmp = path.with_extension("yaml.tmp");
        tokio::fs::write(&tmp, serde_yaml::to_string(record)?).await?;
        tokio::fs::rename(tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl UnitStore for FileStore {
    async fn fetch(&self, mac: &str) -> Result<Option<UnitRecord>, StoreError> {
        self.load(&self.record_path(mac)).await
    }

    async fn list(&self) -> Result<Vec<UnitRecord>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();

            if !entry.file_type().await?.is_file()
                || entry_path.extension() != Some(OsStr::new("yaml"))
            {
                continue;
            }

            match self.load(&entry_path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    error!("Failed to read unit file {}: {}", entry_path.display(), e);
                    continue;
                }
            }
        }

        records.sort_by(|a, b| a.mac.cmp(&b.mac));
        Ok(records)
    }

    async fn modify(&self, mac: &str, mutation: Mutation<'_>) -> Result<Outcome, StoreError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.load(&self.record_path(mac)).await?;
        let write = mutation(existing.as_ref());
        let kind = write.kind();
        let record = resolve(existing.as_ref(), write);
        if let (Some(row), WriteKind::Insert | WriteKind::Update) = (&record, kind) {
            self.save(row).await?;
        }
        Ok(Outcome { kind, record })
    }
}

/// File name for a unit: bytes outside `[A-Za-z0-9._-]` are percent-encoded
/// so identifiers such as MAC addresses map to distinct, portable names.
pub fn file_stem(mac: &str) -> String {
    let mut stem = String::with_capacity(mac.len());
    for byte in mac.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => stem.push(byte as char),
            _ => stem.push_str(&format!("%{:02X}", byte)),
        }
    }
    stem
}
