//! Error types for maildelegate-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading [`crate::Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required setting was neither in the file nor in the environment.
    #[error("missing required setting '{key}' (set it in the config file or {env})")]
    Missing { key: &'static str, env: &'static str },

    /// A setting was present but unusable.
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },

    /// `dirs::home_dir()` returned `None` and no explicit config path was given.
    #[error("cannot determine home directory; pass --config or set $HOME")]
    HomeNotFound,
}
