use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::models::patient::{PatientDraft, PatientUpdate};
use crate::service::{PatientRegistry, SortKey, SortOrder};

type Registry = web::Data<PatientRegistry>;

pub async fn home() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Patient management system API" }))
}

pub async fn about() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "A fully functional API to manage your patient records"
    }))
}

pub async fn view(registry: Registry) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(registry.list()?))
}

pub async fn view_patient(
    registry: Registry,
    patient_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(registry.get(&patient_id)?))
}

#[derive(Debug, Deserialize)]
pub struct SortParams {
    pub sort_by: String,
    pub order: Option<String>,
}

pub async fn selective_patient(
    registry: Registry,
    params: web::Query<SortParams>,
) -> Result<HttpResponse, ApiError> {
    let key: SortKey = params.sort_by.parse()?;
    let order = match params.order.as_deref() {
        Some(order) => order.parse()?,
        None => SortOrder::default(),
    };
    Ok(HttpResponse::Ok().json(registry.sorted(key, order)?))
}

pub async fn create_patient(
    registry: Registry,
    draft: web::Json<PatientDraft>,
) -> Result<HttpResponse, ApiError> {
    let id = registry.create(draft.into_inner())?;
    Ok(HttpResponse::Created().json(json!({
        "message": "patient created successfully",
        "Id": id
    })))
}

pub async fn update_patient(
    registry: Registry,
    patient_id: web::Path<String>,
    update: web::Json<PatientUpdate>,
) -> Result<HttpResponse, ApiError> {
    let patient = registry.update(&patient_id, update.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "patient record updated successfully",
        "patient": patient
    })))
}

pub async fn delete_patient(
    registry: Registry,
    patient_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    registry.delete(&patient_id)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "patient record deleted successfully" })))
}
