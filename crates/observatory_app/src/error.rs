//! Error types for observatory_app

use std::path::PathBuf;

use observatory_layout::LayoutError;
use thiserror::Error;

/// Errors that can occur while configuring or running the site
#[derive(Error, Debug)]
pub enum SiteError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the site schema
    #[error("failed to parse site config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized back to TOML
    #[error("failed to serialize site config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config parsed but violates a site rule
    #[error("invalid site config: {0}")]
    InvalidConfig(String),

    /// Host rejected an operation
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Result type for observatory_app operations
pub type Result<T> = std::result::Result<T, SiteError>;
