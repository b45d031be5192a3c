//! CRUD operations over the patient collection
//!
//! Every call loads the collection fresh from the store; mutating calls save
//! the full collection back before returning. Mutations are serialized by a
//! process-wide lock so concurrent requests cannot drop each other's writes.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, instrument, warn};

use crate::db::RecordStore;
use crate::error::ApiError;
use crate::models::patient::{
    Patient, PatientCollection, PatientDraft, PatientRecord, PatientUpdate,
};
use crate::service::merge::apply_update;

/// Fields the sorted view can order by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Bmi,
    Age,
}

impl FromStr for SortKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bmi" => Ok(Self::Bmi),
            "age" => Ok(Self::Age),
            other => Err(ApiError::BadRequest(format!(
                "invalid sort field '{other}', select one of [bmi, age]"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ApiError::BadRequest(format!(
                "invalid sort order '{other}', select one of [asc, desc]"
            ))),
        }
    }
}

fn compare(key: SortKey, a: &Patient, b: &Patient) -> Ordering {
    match key {
        SortKey::Bmi => a.bmi().total_cmp(&b.bmi()),
        SortKey::Age => a.age().cmp(&b.age()),
    }
}

pub struct PatientRegistry {
    store: Arc<dyn RecordStore>,
    write_lock: Mutex<()>,
}

impl PatientRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<PatientCollection, ApiError> {
        self.store.load().map_err(|err| {
            error!(error = %err, "Failed to load patient records");
            ApiError::from(err)
        })
    }

    fn save(&self, records: &PatientCollection) -> Result<(), ApiError> {
        self.store.save(records).map_err(|err| {
            error!(error = %err, "Failed to save patient records");
            ApiError::from(err)
        })
    }

    #[instrument(skip(self))]
    pub fn list(&self) -> Result<PatientCollection, ApiError> {
        self.load()
    }

    #[instrument(skip(self), fields(patient_id = %id))]
    pub fn get(&self, id: &str) -> Result<Patient, ApiError> {
        self.load()?
            .remove(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    /// Every record ordered by `key`; ties keep Id order
    #[instrument(skip(self))]
    pub fn sorted(&self, key: SortKey, order: SortOrder) -> Result<Vec<PatientRecord>, ApiError> {
        let mut records: Vec<PatientRecord> = self
            .load()?
            .into_iter()
            .map(|(id, patient)| PatientRecord { id, patient })
            .collect();

        records.sort_by(|a, b| {
            let ordering = compare(key, &a.patient, &b.patient);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(records)
    }

    #[instrument(skip(self, draft), fields(patient_id = ?draft.id))]
    pub fn create(&self, draft: PatientDraft) -> Result<String, ApiError> {
        let (id, patient) = draft.into_patient().map_err(|err| {
            warn!(error = %err, "Rejected patient record");
            err
        })?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load()?;
        if records.contains_key(&id) {
            warn!(patient_id = %id, "Patient already exists");
            return Err(ApiError::Conflict(id));
        }

        records.insert(id.clone(), patient);
        self.save(&records)?;
        info!(patient_id = %id, "Patient created");
        Ok(id)
    }

    #[instrument(skip(self, update), fields(patient_id = %id))]
    pub fn update(&self, id: &str, update: PatientUpdate) -> Result<Patient, ApiError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load()?;
        let existing = records
            .get(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let patient = apply_update(id, existing, update).map_err(|err| {
            warn!(error = %err, "Rejected patient update");
            err
        })?;

        records.insert(id.to_string(), patient.clone());
        self.save(&records)?;
        info!(bmi = patient.bmi(), verdict = %patient.verdict(), "Patient updated");
        Ok(patient)
    }

    #[instrument(skip(self), fields(patient_id = %id))]
    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load()?;
        if records.remove(id).is_none() {
            return Err(ApiError::NotFound(id.to_string()));
        }

        self.save(&records)?;
        info!("Patient deleted");
        Ok(())
    }
}
