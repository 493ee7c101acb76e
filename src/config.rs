//! Typed configuration from environment variables.
//!
//! Loaded once at startup; invalid values fail fast.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::scheduler::DEFAULT_DAILY_CAPACITY;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = "data/db.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub daily_capacity: f64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_raw = lookup("FAIRSHARE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("FAIRSHARE_ADDR '{addr_raw}': {e}")))?;

        let db_path = lookup("FAIRSHARE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let daily_capacity = match lookup("FAIRSHARE_DAILY_CAPACITY") {
            Some(raw) => parse_capacity(&raw)?,
            None => DEFAULT_DAILY_CAPACITY,
        };

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            addr,
            db_path,
            daily_capacity,
            log_level,
        })
    }
}

fn parse_capacity(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("FAIRSHARE_DAILY_CAPACITY '{raw}' is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Config(format!(
            "FAIRSHARE_DAILY_CAPACITY must be positive, got {raw}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.daily_capacity, DEFAULT_DAILY_CAPACITY);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("FAIRSHARE_ADDR", "0.0.0.0:8080"),
            ("FAIRSHARE_DB_PATH", "/tmp/tasks.json"),
            ("FAIRSHARE_DAILY_CAPACITY", "5"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.db_path, PathBuf::from("/tmp/tasks.json"));
        assert_eq!(config.daily_capacity, 5.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[("FAIRSHARE_ADDR", "nowhere")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FAIRSHARE_DAILY_CAPACITY", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FAIRSHARE_DAILY_CAPACITY", "lots")])).is_err());
    }
}
