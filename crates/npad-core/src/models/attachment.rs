//! Attachment model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

use super::entry::EntryId;

/// A unique identifier for an attachment, using UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    /// Create a new unique attachment ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID.
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttachmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A file attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: AttachmentId,
    /// Parent entry identifier.
    pub entry_id: EntryId,
    /// Location inside the managed storage root, `/`-separated.
    pub relative_path: String,
    /// File name shown to the user.
    pub file_name: String,
    /// Original file extension, empty when the file has none.
    pub file_type: String,
    /// Creation timestamp (Unix ms).
    pub created_at: i64,
}

impl Attachment {
    /// Create attachment metadata for a file stored at `relative_path`.
    ///
    /// The path is stored exactly as given so it keeps naming the file the
    /// content store wrote. The file name and type are taken from the last
    /// path component.
    pub fn new(entry_id: EntryId, relative_path: impl Into<String>) -> Result<Self> {
        let relative_path = relative_path.into();
        validate_relative_path(&relative_path)?;

        let path = Path::new(&relative_path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Attachment relative_path has no file name: {relative_path}"
                ))
            })?;
        let file_type = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            id: AttachmentId::new(),
            entry_id,
            relative_path,
            file_name,
            file_type,
            created_at: chrono::Utc::now().timestamp_millis(),
        })
    }
}

/// Reject paths that do not name a file below the storage root.
fn validate_relative_path(relative_path: &str) -> Result<()> {
    if relative_path.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Attachment relative_path cannot be empty".to_string(),
        ));
    }

    let invalid_segment = relative_path
        .split('/')
        .any(|segment| segment.trim().is_empty() || segment == "." || segment == "..");
    if invalid_segment {
        return Err(Error::InvalidInput(format!(
            "Attachment relative_path has an empty or relative segment: {relative_path:?}"
        )));
    }
    Ok(())
}
