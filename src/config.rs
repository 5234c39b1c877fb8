use std::env;

use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "cfg/config.json";
const CONFIG_PATH_VAR: &str = "WEATHER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("cannot read store credentials {path}: {reason}")]
    Credentials { path: String, reason: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings { bind: String::from("0.0.0.0:3002") }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_unit_group")]
    pub unit_group: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Firestore,
    Memory,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Service-account JSON: project id and the key access tokens are minted with.
    pub credentials: String,
    pub collection: String,
    pub emulator_host: Option<String>,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: StoreBackend::Firestore,
            credentials: String::from("sdk.json"),
            collection: String::from("weather_data"),
            emulator_host: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    String::from("https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline/")
}

fn default_unit_group() -> String {
    String::from("metric")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

impl Settings {
    /// Reads the file named by `WEATHER_CONFIG` (or `cfg/config.json`), then
    /// applies `WEATHER_*` overrides such as `WEATHER_PROVIDER__API_KEY`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| String::from(DEFAULT_CONFIG_PATH));

        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("WEATHER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize::<Settings>()?)
    }
}
