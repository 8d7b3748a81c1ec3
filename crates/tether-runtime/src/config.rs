#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! [`RuntimeConfig`] is plain data with serde support. It can be built in
//! code, read from a TOML file (feature `config-file`), and overridden from
//! the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TETHER_MAX_RENDERS_PER_FLUSH` | `max_renders_per_flush` |
//! | `TETHER_LOG_RENDERS` | `log_renders` |

use std::env;
#[cfg(feature = "config-file")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_MAX_RENDERS_PER_FLUSH: &str = "TETHER_MAX_RENDERS_PER_FLUSH";
pub const ENV_LOG_RENDERS: &str = "TETHER_LOG_RENDERS";

const DEFAULT_MAX_RENDERS_PER_FLUSH: usize = 10_000;

/// Tunables for [`Host`](crate::host::Host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Upper bound on renders performed by a single flush. Must be non-zero.
    pub max_renders_per_flush: usize,
    /// Log every render at `info` instead of `debug`.
    pub log_renders: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_renders_per_flush: DEFAULT_MAX_RENDERS_PER_FLUSH,
            log_renders: false,
        }
    }
}

impl RuntimeConfig {
    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_renders_per_flush == 0 {
            return Err(ConfigError::Invalid {
                key: "max_renders_per_flush",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `TETHER_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_MAX_RENDERS_PER_FLUSH) {
            self.max_renders_per_flush =
                raw.trim().parse().map_err(|err| ConfigError::Invalid {
                    key: "max_renders_per_flush",
                    reason: format!("{raw:?}: {err}"),
                })?;
        }
        if let Some(raw) = lookup(ENV_LOG_RENDERS) {
            self.log_renders = parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "log_renders",
                reason: format!("{raw:?} is not a boolean"),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Parse a TOML document. Missing keys take their defaults.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    #[cfg(feature = "config-file")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading runtime config");
        Self::from_toml_str(&source)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_renders_per_flush, 10_000);
        assert!(!config.log_renders);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = RuntimeConfig {
            max_renders_per_flush: 0,
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                key: "max_renders_per_flush",
                ..
            })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let config = RuntimeConfig::default()
            .apply_overrides(env_of(&[
                (ENV_MAX_RENDERS_PER_FLUSH, " 64 "),
                (ENV_LOG_RENDERS, "yes"),
            ]))
            .unwrap();
        assert_eq!(config.max_renders_per_flush, 64);
        assert!(config.log_renders);
    }

    #[test]
    fn env_without_overrides_keeps_values() {
        let base = RuntimeConfig {
            max_renders_per_flush: 5,
            log_renders: true,
        };
        let config = base.clone().apply_overrides(env_of(&[])).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn bad_env_values_are_reported() {
        let err = RuntimeConfig::default()
            .apply_overrides(env_of(&[(ENV_MAX_RENDERS_PER_FLUSH, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_renders_per_flush"));

        let err = RuntimeConfig::default()
            .apply_overrides(env_of(&[(ENV_LOG_RENDERS, "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("log_renders"));

        let err = RuntimeConfig::default()
            .apply_overrides(env_of(&[(ENV_MAX_RENDERS_PER_FLUSH, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
