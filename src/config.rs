use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::logging;

const DEFAULT_CURRENCY: &str = "Rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    pub currency: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values fall back to defaults;
    /// anything else that does not parse is an error.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match get("PROJCOST_DATA_DIR") {
            Some(dir) => PathBuf::from(dir.trim()),
            None => directories::ProjectDirs::from("com", "projcost", "ProjCost")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| anyhow!("Could not determine data directory"))?,
        };
        if !data_dir.is_absolute() {
            bail!(
                "PROJCOST_DATA_DIR must be an absolute path, got `{}`",
                data_dir.display()
            );
        }

        let log_level = match get("PROJCOST_LOG_LEVEL") {
            Some(level) => logging::normalize_level(&level)?,
            None => logging::default_level(),
        };

        let currency = match get("PROJCOST_CURRENCY") {
            Some(c) if c.trim().chars().count() > 8 => {
                bail!("PROJCOST_CURRENCY is too long: `{}`", c.trim())
            }
            Some(c) => c.trim().to_string(),
            None => DEFAULT_CURRENCY.to_string(),
        };

        Ok(Self {
            data_dir,
            log_level,
            currency,
        })
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.data_dir.join("projcost.db")
    }

    pub(crate) fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

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
    fn test_explicit_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("PROJCOST_DATA_DIR", "/tmp/projcost"),
            ("PROJCOST_LOG_LEVEL", "WARN"),
            ("PROJCOST_CURRENCY", "$"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/projcost"));
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.currency, "$");
        assert_eq!(cfg.db_path(), PathBuf::from("/tmp/projcost/projcost.db"));
        assert_eq!(cfg.log_dir(), PathBuf::from("/tmp/projcost/logs"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let cfg = Config::from_lookup(lookup(&[
            ("PROJCOST_DATA_DIR", "/data"),
            ("PROJCOST_LOG_LEVEL", "  "),
            ("PROJCOST_CURRENCY", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.log_level, logging::default_level());
        assert_eq!(cfg.currency, "Rs");
    }

    #[test]
    fn test_invalid_level_is_fatal() {
        let err = Config::from_lookup(lookup(&[
            ("PROJCOST_DATA_DIR", "/data"),
            ("PROJCOST_LOG_LEVEL", "loud"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported log level"));
    }

    #[test]
    fn test_relative_data_dir_is_fatal() {
        let err = Config::from_lookup(lookup(&[("PROJCOST_DATA_DIR", "data")])).unwrap_err();
        assert!(err.to_string().contains("absolute path"));
    }

    #[test]
    fn test_long_currency_is_fatal() {
        let err = Config::from_lookup(lookup(&[
            ("PROJCOST_DATA_DIR", "/data"),
            ("PROJCOST_CURRENCY", "dollars and cents"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("too long"));
    }
}
