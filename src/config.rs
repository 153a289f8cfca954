use serde::Deserialize;
use std::collections::HashMap;
use config::{Config, ConfigError};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config/default";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Browser profile the transport presents, e.g. `chrome133`.
    pub emulation: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// File backing the persisted session. Empty keeps the session in memory.
    pub path: String,
    pub key: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_path(DEFAULT_CONFIG_PATH)
    }

    /// Loads `path` (any extension the `config` crate understands) on top of
    /// built-in defaults, then applies `APP_` environment overrides such as
    /// `APP_API__BASE_URL`. A missing file is not an error.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.emulation", "chrome133")?
            .set_default("session.path", ".vendor-admin/session.json")?
            .set_default("session.key", "adminToken")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build()?;

        if let Ok(headers) = config.get_table("api.headers") {
            debug!(
                ?headers,
                "Loaded API headers from configuration"
            );
        }

        let settings: Settings = config.try_deserialize()?;

        debug!(
            base_url = %settings.api.base_url,
            emulation = %settings.api.emulation,
            session_path = %settings.session.path,
            "Parsed settings"
        );

        Ok(settings)
    }
}
