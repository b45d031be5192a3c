//! Patient records API
//!
//! Main entry point for the patient records HTTP server.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;

use patient_records::db::JsonFileStore;
use patient_records::service::PatientRegistry;
use patient_records::{api, config, telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = config::load_config().context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    // Open the record file
    let store = JsonFileStore::open(&config.storage.path, config.storage.create_if_missing)
        .with_context(|| format!("failed to open record file {}", config.storage.path))?;
    let registry = web::Data::new(PatientRegistry::new(Arc::new(store)));

    info!(
        host = %config.server.host,
        port = config.server.port,
        storage = %config.storage.path,
        "Starting patient records API"
    );

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
