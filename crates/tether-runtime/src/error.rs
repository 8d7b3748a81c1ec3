#![forbid(unsafe_code)]

//! Error types for the render host and configuration loading.
//!
//! Selector and mapping closures are infallible; a panic inside one unwinds
//! out of the render pass untouched. The errors here cover host bookkeeping
//! and config parsing only.

use std::path::PathBuf;

use crate::queue::ComponentId;

/// Failures reported by [`Host`](crate::host::Host) operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HostError {
    #[error("component {0} is not mounted")]
    UnknownComponent(ComponentId),

    #[error("component {id} ({component}) expects props of type {expected}")]
    PropsTypeMismatch {
        id: ComponentId,
        component: &'static str,
        expected: &'static str,
    },

    /// A flush rendered more components than the configured limit, which
    /// usually means a render pass keeps updating the store it reads.
    #[error("flush exceeded {limit} renders; {pending} components still queued")]
    FlushLimitExceeded { limit: usize, pending: usize },
}

/// Failures while loading or validating [`RuntimeConfig`](crate::config::RuntimeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "config-file")]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
