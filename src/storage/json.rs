//! Deal store backed by one pretty-printed JSON array file

use super::traits::{DealStore, StorageError, StorageResult};
use crate::model::DealRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON file store
///
/// Every write goes to a temporary file in the target directory, which is
/// then renamed over the target. Readers see either the old or the new
/// collection, never a partial one. A missing file reads as an empty store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Opens a store at `path`, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

impl DealStore for JsonStore {
    fn load_all(&self) -> StorageResult<Vec<DealRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn replace_all(&mut self, records: &[DealRecord]) -> StorageResult<()> {
        let mut temp = NamedTempFile::new_in(self.directory())?;
        serde_json::to_writer_pretty(&mut temp, records)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    fn insert(&mut self, record: &DealRecord) -> StorageResult<()> {
        let mut records = self.load_all()?;
        if records.iter().any(|r| r.link == record.link) {
            return Err(StorageError::Duplicate(record.link.clone()));
        }
        records.push(record.clone());
        self.replace_all(&records)
    }

    fn get(&self, link: &str) -> StorageResult<Option<DealRecord>> {
        Ok(self.load_all()?.into_iter().find(|r| r.link == link))
    }

    fn replace(&mut self, record: &DealRecord) -> StorageResult<()> {
        let mut records = self.load_all()?;
        let slot = records
            .iter_mut()
            .find(|r| r.link == record.link)
            .ok_or_else(|| StorageError::NotFound(record.link.clone()))?;
        *slot = record.clone();
        self.replace_all(&records)
    }
}
