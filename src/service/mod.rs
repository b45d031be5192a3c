//! Patient record operations, independent of the HTTP layer

pub mod merge;
pub mod registry;

pub use registry::{PatientRegistry, SortKey, SortOrder};
