use npad_core::services::NotebookService;

use crate::commands::common::{report_commit_error, resolve_entry};
use crate::error::CliError;

pub fn run_delete(id: &str, service: &NotebookService) -> Result<(), CliError> {
    let entry = resolve_entry(id, service)?;

    service.delete_entry(&entry)?;
    report_commit_error(service);

    println!("{}", entry.id);
    Ok(())
}
