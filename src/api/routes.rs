use actix_web::web;

use super::{extract, handlers};

/// Register the patient API on an actix app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extract::json_config())
        .app_data(extract::query_config())
        .route("/", web::get().to(handlers::home))
        .route("/about", web::get().to(handlers::about))
        .route("/view", web::get().to(handlers::view))
        .route("/view_patient/{patient_id}", web::get().to(handlers::view_patient))
        .route("/selective_patient", web::get().to(handlers::selective_patient))
        .route("/create", web::post().to(handlers::create_patient))
        .route("/edit/{patient_id}", web::put().to(handlers::update_patient))
        .route("/delete/{patient_id}", web::delete().to(handlers::delete_patient));
}
