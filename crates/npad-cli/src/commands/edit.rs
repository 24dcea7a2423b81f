use npad_core::services::NotebookService;
use npad_core::Entry;

use crate::commands::common::{report_commit_error, resolve_entry};
use crate::error::CliError;

/// Requested changes; unset fields keep their current value.
#[derive(Debug, Default)]
pub struct EditChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_title: bool,
    pub clear_description: bool,
}

impl EditChanges {
    /// Title and description to store for `entry`.
    pub fn apply(self, entry: &Entry) -> (Option<String>, Option<String>) {
        let title = if self.clear_title {
            None
        } else {
            self.title.or_else(|| entry.title.clone())
        };
        let description = if self.clear_description {
            None
        } else {
            self.description.or_else(|| entry.description.clone())
        };
        (title, description)
    }
}

pub fn run_edit(id: &str, changes: EditChanges, service: &NotebookService) -> Result<(), CliError> {
    let entry = resolve_entry(id, service)?;
    let (title, description) = changes.apply(&entry);

    let updated = service.update_entry(&entry.id, title.as_deref(), description.as_deref())?;
    report_commit_error(service);

    println!("{}", updated.id);
    Ok(())
}
