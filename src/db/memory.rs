use std::sync::{Mutex, PoisonError};

use super::{RecordStore, StoreError};
use crate::models::patient::PatientCollection;

/// In-memory record store for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<PatientCollection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: PatientCollection) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> PatientCollection {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<PatientCollection, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, records: &PatientCollection) -> Result<(), StoreError> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.clone();
        Ok(())
    }
}
