use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading a [`crate::CourierConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration is not valid RON for this schema.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
