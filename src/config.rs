//! Configuration file for a [`crate::Courier`]
//!
//! ```text
//! (
//!     dispatch: (
//!         max_concurrency: Some(5),
//!         max_rate: Some(14),
//!     ),
//!     audit: (
//!         redact_recipients: true,
//!     ),
//! )
//! ```

use std::path::Path;

use courier_common::internal;
use courier_dispatch::DispatchConfig;
use courier_transport::AuditConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Concurrency and rate limits
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Attempt event reporting
    #[serde(default)]
    pub audit: AuditConfig,
}

impl CourierConfig {
    /// Parse a configuration from RON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `content` does not match the schema.
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(content)?)
    }

    /// Read and parse a RON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its content does not match the schema.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config = Self::from_ron(&content)?;
        internal!(
            level = DEBUG,
            path = %path.display(),
            max_concurrency = ?config.dispatch.max_concurrency,
            max_rate = ?config.dispatch.max_rate,
            "Loaded configuration"
        );

        Ok(config)
    }
}
