//! Patient records API core library
//!
//! This module exports the record store, the patient model, the registry
//! operations and the HTTP surface built on top of them.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod telemetry;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub storage: StorageConfig,
        pub logging: LoggingConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StorageConfig {
        pub path: String,
        pub create_if_missing: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum LogFormat {
        Pretty,
        Json,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct LoggingConfig {
        pub level: String,
        pub format: LogFormat,
    }

    /// Load configuration from defaults, files and the environment
    pub fn load_config() -> Result<Config, ::config::ConfigError> {
        // Selects config/{env}.toml layered over the defaults
        let env = std::env::var("PATIENTS_ENV").unwrap_or_else(|_| "development".into());

        ::config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000_i64)?
            .set_default("storage.path", "data/patients.json")?
            .set_default("storage.create_if_missing", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables, e.g. PATIENTS__SERVER__PORT
            .add_source(
                ::config::Environment::with_prefix("PATIENTS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

}
