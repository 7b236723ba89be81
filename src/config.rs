use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Settings consumed by the fetch client, store and storage
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the recipes endpoint, without a trailing slash
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,
    /// Number of search results shown per page
    #[serde(default = "default_results_per_page")]
    pub results_per_page: usize,
    /// Request timeout in seconds (fractions allowed)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// File backing the key/value storage used by the command line
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Storage key holding the serialized bookmarks
    #[serde(default = "default_bookmarks_key")]
    pub bookmarks_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            results_per_page: default_results_per_page(),
            timeout_secs: default_timeout_secs(),
            storage_path: default_storage_path(),
            bookmarks_key: default_bookmarks_key(),
        }
    }
}

// Default value functions
fn default_api_url() -> String {
    "https://forkify-api.herokuapp.com/api/v2/recipes".to_string()
}

fn default_results_per_page() -> usize {
    10
}

fn default_timeout_secs() -> f64 {
    10.0
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("forkify-storage.json")
}

fn default_bookmarks_key() -> String {
    "bookmarks".to_string()
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables with FORKIFY__ prefix
    /// 2. forkify.toml file in current directory
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        load_settings()
    }

    /// The request timeout as a duration; negative or non-finite values fall back to the default
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout_secs()))
    }
}

/// Load settings from `forkify.toml` and `FORKIFY__*` environment variables
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("forkify").required(false))
        .add_source(
            Environment::with_prefix("FORKIFY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
