use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Remote document store (Firestore REST) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// REST endpoint root.
    /// TOML: `remote.base_url`. Default: `https://firestore.googleapis.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Cloud project that owns the database (required).
    /// TOML: `remote.project_id`.
    #[serde(default)]
    pub project_id: String,

    /// Database id inside the project.
    /// TOML: `remote.database`. Default: `(default)`.
    #[serde(default = "default_database")]
    pub database: String,

    /// Optional web API key, sent as the `key` query parameter.
    /// TOML: `remote.api_key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Documents requested per page when listing a collection.
    /// TOML: `remote.page_size`. Default: `300`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Optional HTTP proxy for the reqwest client.
    /// TOML: `remote.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Transport-level timeout for a single page request, in seconds.
    /// The sync deadlines still apply on top of it.
    /// TOML: `remote.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            project_id: String::new(),
            database: default_database(),
            api_key: None,
            page_size: default_page_size(),
            proxy: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://firestore.googleapis.com").expect("valid default firestore url")
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_page_size() -> u32 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}
