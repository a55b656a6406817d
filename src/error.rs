//! Error types for the player core

use std::path::PathBuf;

/// Failures surfaced to the user. Navigation, seeking and rate changes
/// never produce one of these.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("No .{extension} files found in {}", folder.display())]
    NoMediaFound { folder: PathBuf, extension: String },

    #[error("Folder access unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("A folder selection is already in progress")]
    SelectionInProgress,

    #[cfg(feature = "sqlite")]
    #[error("Stats storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Stats serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
