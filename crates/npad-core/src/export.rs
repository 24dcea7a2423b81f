//! Entry export helpers.

use serde::{Deserialize, Serialize};

use crate::{Attachment, Entry};

/// Serializable attachment representation used in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportAttachment {
    pub relative_path: String,
    pub file_name: String,
    pub file_type: String,
}

/// Serializable entry representation used in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub attachments: Vec<ExportAttachment>,
}

fn attachment_to_export_item(attachment: &Attachment) -> ExportAttachment {
    ExportAttachment {
        relative_path: attachment.relative_path.clone(),
        file_name: attachment.file_name.clone(),
        file_type: attachment.file_type.clone(),
    }
}

/// Convert an entry into an export record.
#[must_use]
pub fn entry_to_export_item(entry: &Entry) -> ExportEntry {
    ExportEntry {
        id: entry.id.to_string(),
        title: entry.title.clone(),
        description: entry.description.clone(),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        attachments: entry
            .attachments
            .iter()
            .map(attachment_to_export_item)
            .collect(),
    }
}

/// Render entries as pretty-printed JSON.
pub fn render_json_export(entries: &[Entry]) -> serde_json::Result<String> {
    let items = entries
        .iter()
        .map(entry_to_export_item)
        .collect::<Vec<ExportEntry>>();
    serde_json::to_string_pretty(&items)
}
