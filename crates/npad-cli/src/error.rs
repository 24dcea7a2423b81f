use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] npad_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Entry ID cannot be empty")]
    EmptyEntryId,
    #[error("No files given to attach")]
    NoFiles,
    #[error("Entry not found for id/prefix: {0}")]
    EntryNotFound(String),
    #[error("{0}")]
    AmbiguousEntryId(String),
    #[error("{failed} of {total} attachments could not be placed")]
    PlacementFailed { failed: usize, total: usize },
}
