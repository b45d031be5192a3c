pub mod patient;

pub use patient::{Gender, Patient, PatientCollection, PatientDraft, PatientUpdate, Verdict};
