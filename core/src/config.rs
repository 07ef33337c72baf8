//! Environment configuration for the default transport and shard layout.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::error::ApiError;
use crate::shard::{ShardRouter, DEFAULT_COLLECTION};
use crate::transport::ReqwestTransport;

pub const DATABASE_URLS_VAR: &str = "APPOINTMENT_DATABASE_URLS";
pub const COLLECTION_VAR: &str = "APPOINTMENT_COLLECTION";
pub const TIMEOUT_VAR: &str = "APPOINTMENT_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub database_urls: Vec<String>,
    pub collection: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_urls = lookup(DATABASE_URLS_VAR).ok_or(ConfigError::Missing(DATABASE_URLS_VAR))?;
        let database_urls: Vec<String> = raw_urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
        if database_urls.is_empty() {
            return Err(ConfigError::Invalid {
                var: DATABASE_URLS_VAR,
                value: raw_urls,
            });
        }

        let collection = lookup(COLLECTION_VAR)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| {
                info!("{COLLECTION_VAR} not set, using default: {DEFAULT_COLLECTION}");
                DEFAULT_COLLECTION.to_string()
            });
        // Only a top-level collection is addressable: `{root}/{collection}.json`.
        if collection.contains('/') {
            return Err(ConfigError::Invalid {
                var: COLLECTION_VAR,
                value: collection,
            });
        }

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            database_urls,
            collection,
            timeout,
        })
    }

    pub fn router(&self) -> Result<ShardRouter, ConfigError> {
        ShardRouter::new(&self.database_urls, &self.collection)
            .ok_or(ConfigError::Missing(DATABASE_URLS_VAR))
    }

    pub fn transport(&self) -> Result<ReqwestTransport, ApiError> {
        ReqwestTransport::new(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = ClientConfig::from_lookup(lookup(&[(DATABASE_URLS_VAR, "https://h1.example")])).unwrap();
        assert_eq!(config.database_urls, ["https://h1.example"]);
        assert_eq!(config.collection, "appointments");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn urls_are_split_and_trimmed() {
        let config = ClientConfig::from_lookup(lookup(&[
            (DATABASE_URLS_VAR, " https://h1.example , https://h2.example,,"),
            (COLLECTION_VAR, "bookings"),
            (TIMEOUT_VAR, "3"),
        ]))
        .unwrap();
        assert_eq!(config.database_urls, ["https://h1.example", "https://h2.example"]);
        assert_eq!(config.collection, "bookings");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.router().unwrap().len(), 2);
    }

    #[test]
    fn missing_urls_is_an_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(DATABASE_URLS_VAR));
    }

    #[test]
    fn blank_urls_are_invalid() {
        let err = ClientConfig::from_lookup(lookup(&[(DATABASE_URLS_VAR, " , ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DATABASE_URLS_VAR, .. }));
    }

    #[test]
    fn nested_collection_is_invalid() {
        for raw in ["clinic/appointments", "/appointments"] {
            let err = ClientConfig::from_lookup(lookup(&[
                (DATABASE_URLS_VAR, "https://h1.example"),
                (COLLECTION_VAR, raw),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    var: COLLECTION_VAR,
                    value: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn bad_timeout_is_invalid() {
        for raw in ["soon", "0", "-5"] {
            let err = ClientConfig::from_lookup(lookup(&[
                (DATABASE_URLS_VAR, "https://h1.example"),
                (TIMEOUT_VAR, raw),
            ]))
            .unwrap_err();
            assert_eq!(
                err,
                ConfigError::Invalid {
                    var: TIMEOUT_VAR,
                    value: raw.to_string()
                }
            );
        }
    }
}
