//! Runtime configuration read from the environment

use crate::error::{CarryLinkError, Result};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const STORE_PATH_VAR: &str = "CARRYLINK_STORE_PATH";
pub const LOG_VAR: &str = "CARRYLINK_LOG";
pub const CAS_RETRIES_VAR: &str = "CARRYLINK_CAS_RETRIES";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    pub log_level: String,
    /// Attempts per write before a version conflict is reported
    pub cas_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("carrylink.json"),
            log_level: "info".to_string(),
            cas_retries: 3,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            store_path: lookup(STORE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            log_level: lookup(LOG_VAR).unwrap_or(defaults.log_level),
            cas_retries: parse_or_default(&lookup, CAS_RETRIES_VAR, defaults.cas_retries)?,
        };

        if config.cas_retries == 0 {
            return Err(CarryLinkError::InvalidConfig(format!(
                "{CAS_RETRIES_VAR} must be at least 1"
            )));
        }

        Ok(config)
    }

    /// Log filter for the subscriber, from `log_level`
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level).map_err(|err| {
            CarryLinkError::Configuration(format!("invalid log filter '{}': {err}", self.log_level))
        })
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| CarryLinkError::InvalidConfig(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (STORE_PATH_VAR, "/tmp/packages.json"),
            (LOG_VAR, "carrylink=debug"),
            (CAS_RETRIES_VAR, " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.store_path, PathBuf::from("/tmp/packages.json"));
        assert_eq!(config.log_level, "carrylink=debug");
        assert_eq!(config.cas_retries, 5);
    }

    #[test]
    fn test_invalid_retries() {
        let result = Config::from_lookup(lookup(&[(CAS_RETRIES_VAR, "many")]));
        assert!(matches!(result, Err(CarryLinkError::InvalidConfig(_))));

        let result = Config::from_lookup(lookup(&[(CAS_RETRIES_VAR, "0")]));
        assert!(matches!(result, Err(CarryLinkError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_filter() {
        let config = Config::default();
        assert!(config.env_filter().is_ok());

        let config = Config {
            log_level: "carrylink=notalevel".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.env_filter(),
            Err(CarryLinkError::Configuration(_))
        ));
    }
}
