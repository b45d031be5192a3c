//! Record store for the patient registry
//!
//! The whole collection is read and written as one unit. Backends implement
//! [`RecordStore`]; the registry never touches files directly.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::patient::PatientCollection;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors raised while reading or writing the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("failed to access record file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record file {} is not a valid patient collection: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode patient collection: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Load/save contract for the full patient collection
#[cfg_attr(test, mockall::automock)]
pub trait RecordStore: Send + Sync {
    /// Read the entire collection
    fn load(&self) -> Result<PatientCollection, StoreError>;

    /// Replace the entire collection
    fn save(&self, records: &PatientCollection) -> Result<(), StoreError>;
}
