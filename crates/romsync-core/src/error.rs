//! Error types for romsync-core

use thiserror::Error;

/// Result type alias using romsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in romsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog server rejected a request
    #[error("Remote catalog error: {0}")]
    Remote(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No directory could be inferred for a download
    #[error("Cannot determine save location for slug {0}: no existing save files")]
    SaveLocationUnknown(String),

    /// Upload requested without a local save
    #[error("Cannot upload: no local save file")]
    MissingLocalSave,

    /// Download requested without a remote save
    #[error("Cannot download: no remote save")]
    MissingRemoteSave,

    /// Failed to re-stamp a save file's modification time
    #[error("Failed to update file timestamp for {path}: {source}")]
    Timestamp {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Background task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
