use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{RecordStore, StoreError};
use crate::models::patient::PatientCollection;

/// Flat JSON file holding every patient keyed by Id.
///
/// Writes overwrite the file in place; a crash mid-write can leave a
/// truncated file behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Wrap an existing record file. No I/O happens until the first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the record file, seeding an empty collection when it is absent
    /// and `create_if_missing` is set.
    pub fn open(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if store.path.exists() {
            return Ok(store);
        }
        if !create_if_missing {
            return Err(StoreError::Missing(store.path.clone()));
        }

        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        store.save(&PatientCollection::new())?;
        info!(path = %store.path.display(), "Created empty record file");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<PatientCollection, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::Missing(self.path.clone()),
            _ => StoreError::Io {
                path: self.path.clone(),
                source,
            },
        })?;

        let records: PatientCollection =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = records.len(), "Loaded patient records");
        Ok(records)
    }

    fn save(&self, records: &PatientCollection) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;
        fs::write(&self.path, bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(count = records.len(), "Saved patient records");
        Ok(())
    }
}
