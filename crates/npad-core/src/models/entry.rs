//! Entry model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::attachment::Attachment;

/// A unique identifier for an entry, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A text entry with its attached files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, immutable once assigned
    pub id: EntryId,
    /// Optional title
    pub title: Option<String>,
    /// Optional body text
    pub description: Option<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
    /// Attached files, ordered by relative path and unique per path
    pub attachments: Vec<Attachment>,
}

impl Entry {
    /// Create a new entry with a fresh identifier and no attachments
    #[must_use]
    pub fn new(title: Option<String>, description: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: EntryId::new(),
            title,
            description,
            created_at: now,
            updated_at: now,
            attachments: Vec::new(),
        }
    }

    /// Look up an attachment by its relative path
    #[must_use]
    pub fn attachment(&self, relative_path: &str) -> Option<&Attachment> {
        self.attachments
            .iter()
            .find(|attachment| attachment.relative_path == relative_path)
    }

    /// Merge attachments into this entry, keeping one attachment per relative path.
    ///
    /// Existing attachments win over incoming ones with the same path.
    pub fn merge_attachments(&mut self, incoming: impl IntoIterator<Item = Attachment>) {
        for attachment in incoming {
            if self.attachment(&attachment.relative_path).is_none() {
                self.attachments.push(attachment);
            }
        }
        self.attachments
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    }

    /// Title for list views: the title, else the first description line,
    /// truncated to `max_len` characters
    #[must_use]
    pub fn display_title(&self, max_len: usize) -> String {
        let source = self
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .or_else(|| {
                self.description
                    .as_deref()
                    .and_then(|description| description.lines().next())
            })
            .unwrap_or("Untitled");

        source.trim().chars().take(max_len).collect()
    }
}
