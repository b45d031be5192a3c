//! Extractor configuration mapping payload failures onto [`ApiError`]

use actix_web::error::JsonPayloadError;
use actix_web::web;
use tracing::debug;

use crate::error::{ApiError, FieldViolation};

/// Malformed or mistyped JSON bodies are validation failures (422); a wrong
/// content type or oversized body is a bad request.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!(error = %err, "Rejected request body");
        let err = match err {
            JsonPayloadError::Deserialize(source) => {
                ApiError::Validation(vec![FieldViolation::new("body", source.to_string())])
            }
            other => ApiError::BadRequest(other.to_string()),
        };
        err.into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}
