mod basic;
mod remote;
mod sync;

pub use basic::BasicConfig;
pub use remote::RemoteConfig;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Admin server and storage settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Remote document store settings (see `remote` table in config.toml).
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Sync cycle deadlines and scheduling (see `sync` table in config.toml).
    #[serde(default)]
    pub sync: SyncConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration from the TOML file (with defaults) and validates required fields.
    pub fn from_toml() -> Self {
        if !PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            panic!("config file not found: {DEFAULT_CONFIG_FILE}");
        }
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration from {DEFAULT_CONFIG_FILE}: {err}")
        });
        if let Err(reason) = cfg.validate() {
            panic!("{reason}");
        }
        cfg
    }

    /// Checks the fields that have no usable default.
    pub fn validate(&self) -> Result<(), String> {
        if self.basic.admin_key.trim().is_empty() {
            return Err("basic.admin_key must be set and non-empty".to_string());
        }
        if self.remote.project_id.trim().is_empty() {
            return Err("remote.project_id must be set and non-empty".to_string());
        }
        Ok(())
    }
}

/// Global, lazily-initialized configuration instance for the binary.
///
/// First access panics when `config.toml` is missing or invalid; library code takes `&Config`
/// (or the relevant section) as a parameter instead of reading this.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_toml);
