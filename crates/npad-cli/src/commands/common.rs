use std::path::PathBuf;

use chrono::Utc;
use npad_core::config::NotebookConfig;
use npad_core::services::NotebookService;
use npad_core::storage::{Placement, PlacementOutcome};
use npad_core::{Entry, EntryId};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub preview: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
    pub attachments: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlacementItem {
    pub source: String,
    pub relative_path: String,
    pub destination: String,
    pub outcome: &'static str,
    pub error: Option<String>,
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("npad")
}

/// Defaults, then `NPAD_*` environment variables, then command-line flags.
pub fn resolve_config(
    db_path: Option<PathBuf>,
    storage_root: Option<PathBuf>,
    source_root: Option<PathBuf>,
) -> NotebookConfig {
    let data_dir = default_data_dir();
    let mut config =
        NotebookConfig::new(data_dir.join("npad.db"), data_dir.join("attachments")).with_env_overrides();

    if let Some(path) = db_path {
        config.database_path = Some(path);
    }
    if let Some(path) = storage_root {
        config.storage_root = path;
    }
    if let Some(path) = source_root {
        config.source_root = Some(path);
    }
    config
}

pub fn open_service(config: &NotebookConfig) -> Result<NotebookService, CliError> {
    tracing::debug!(
        database = ?config.database_path,
        storage_root = %config.storage_root.display(),
        "Opening notebook"
    );
    Ok(NotebookService::open(config)?)
}

/// Warn when the last operation could not be committed.
pub fn report_commit_error(service: &NotebookService) {
    if let Some(error) = service.take_commit_error() {
        eprintln!("Warning: changes may not have been saved: {error}");
    }
}

pub fn normalize_entry_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyEntryId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find an entry by full ID or unique ID prefix.
pub fn resolve_entry(entry_query: &str, service: &NotebookService) -> Result<Entry, CliError> {
    let entry_query = normalize_entry_identifier(entry_query)?;

    if let Ok(entry_id) = entry_query.parse::<EntryId>() {
        if let Some(entry) = service.fetch_entry(&entry_id)? {
            return Ok(entry);
        }
    }

    let query = entry_query.to_ascii_lowercase();
    let mut matching = service
        .fetch_entries()?
        .into_iter()
        .filter(|entry| entry.id.to_string().starts_with(&query))
        .collect::<Vec<_>>();

    match matching.len() {
        0 => Err(CliError::EntryNotFound(entry_query)),
        1 => Ok(matching.remove(0)),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|entry| short_id(&entry.id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousEntryId(format!(
                "ID prefix '{entry_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &EntryId) -> String {
    id.to_string().chars().take(13).collect()
}

pub fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    let now_ms = Utc::now().timestamp_millis();
    EntryListItem {
        id: entry.id.to_string(),
        title: entry.title.clone(),
        description: entry.description.clone(),
        preview: entry.display_title(80),
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        relative_time: format_relative_time(entry.updated_at, now_ms),
        attachments: entry
            .attachments
            .iter()
            .map(|attachment| attachment.relative_path.clone())
            .collect(),
    }
}

pub fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    entries
        .iter()
        .map(|entry| {
            let short_id = short_id(&entry.id);
            let preview = entry.display_title(40);
            let relative_time = format_relative_time(entry.updated_at, now_ms);

            match entry.attachments.len() {
                0 => format!("{short_id:<13}  {preview:<40}  {relative_time}"),
                1 => format!("{short_id:<13}  {preview:<40}  {relative_time:<10}  1 file"),
                count => format!("{short_id:<13}  {preview:<40}  {relative_time:<10}  {count} files"),
            }
        })
        .collect()
}

pub fn placement_to_item(placement: &Placement) -> PlacementItem {
    let error = match &placement.outcome {
        PlacementOutcome::Failed(error) => Some(error.to_string()),
        _ => None,
    };

    PlacementItem {
        source: placement.source.display().to_string(),
        relative_path: placement.relative_path.clone(),
        destination: placement.destination.display().to_string(),
        outcome: placement.outcome.label(),
        error,
    }
}

pub fn format_placement_line(placement: &Placement) -> String {
    match &placement.outcome {
        PlacementOutcome::Failed(error) => {
            format!("{:<8}  {}  ({error})", placement.outcome.label(), placement.source.display())
        }
        outcome => format!("{:<8}  {}", outcome.label(), placement.destination.display()),
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
