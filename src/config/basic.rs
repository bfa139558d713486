use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};

/// `[basic]`: where the admin API listens, where records are stored, and who may call it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// sqlx SQLite URL; the file is created on first start.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Fallback filter when `RUST_LOG` is unset.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Shared secret for every route except `/health`. Empty admits nobody; `Config::validate`
    /// rejects it.
    #[serde(default, deserialize_with = "string_or_number")]
    pub admin_key: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            admin_key: String::new(),
        }
    }
}

/// Accepts `admin_key = 12345` as well as `admin_key = "12345"`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "basic.admin_key must be a string or a number, got {other}"
        ))),
    }
}

fn default_listen_ip() -> IpAddr {
    Ipv4Addr::LOCALHOST.into()
}

fn default_listen_port() -> u16 {
    8190
}

fn default_database_url() -> String {
    "sqlite://alumni.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}
