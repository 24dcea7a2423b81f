//! Error types for npad-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using npad-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in npad-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// `SQLite` error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Attachments were requested for an entry that does not exist
    #[error("Cannot attach files: entry not found: {0}")]
    AttachmentTargetNotFound(String),

    /// The backing store rejected a transactional commit
    #[error("Failed to commit pending changes: {0}")]
    CommitFailed(String),

    /// Destination directory chain could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file could not be copied into the managed root
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    FileCopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing managed file could not be replaced
    #[error("Failed to replace {} with {}: {source}", to.display(), from.display())]
    FileReplaceFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
