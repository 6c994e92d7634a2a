use std::env;

use crate::error::ConfigError;

const DEFAULT_DATABASE: &str = "TripSplit";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq)]
pub enum StorageBackend {
    Mongo { uri: String, database: String },
    Memory,
}

/// Server settings, read from the environment (and `.env` if present).
///
/// | variable | default |
/// |---|---|
/// | `TRIPSPLIT_STORAGE` | `mongo` (`mongo` or `memory`) |
/// | `MONGODB_URI` | required for `mongo` |
/// | `TRIPSPLIT_DATABASE` | `TripSplit` |
/// | `TRIPSPLIT_HOST` | `0.0.0.0` |
/// | `TRIPSPLIT_PORT` | `8080` |
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage = match lookup("TRIPSPLIT_STORAGE").as_deref() {
            None | Some("mongo") => StorageBackend::Mongo {
                uri: lookup("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: lookup("TRIPSPLIT_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "TRIPSPLIT_STORAGE",
                    value: other.to_string(),
                })
            }
        };

        let port = match lookup("TRIPSPLIT_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "TRIPSPLIT_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Settings {
            host: lookup("TRIPSPLIT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            storage,
        })
    }
}
