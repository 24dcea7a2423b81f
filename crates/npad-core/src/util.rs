//! Shared utility functions used across multiple modules.

use std::path::PathBuf;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read an environment variable as a path, ignoring blank values.
pub fn env_path(key: &str) -> Option<PathBuf> {
    normalize_text_option(std::env::var(key).ok()).map(PathBuf::from)
}
