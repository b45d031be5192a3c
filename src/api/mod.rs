//! HTTP surface of the patient records API
//!
//! Handlers are thin wrappers over [`crate::service::PatientRegistry`].

pub mod extract;
pub mod handlers;
pub mod routes;

pub use routes::configure;
