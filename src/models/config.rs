//! Configuration model loaded from external sources.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    /// Signs the flash message cookies; at least 64 bytes.
    pub secret: String,
    /// Base URL of the kiosk backend.
    pub api_url: String,
    pub api_token: String,
    /// Identity the dashboard acts as; decides who may flip `active`.
    pub operator_username: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ServerConfig {
    /// Layers `default.yaml`, the optional `{app_env}.yaml` and `APP_*`
    /// environment variables, in that order.
    pub fn load(config_dir: &Path, app_env: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(config_dir.join("default.yaml")))
            .add_source(File::from(config_dir.join(format!("{app_env}.yaml"))).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
