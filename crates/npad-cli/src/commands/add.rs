use npad_core::services::NotebookService;

use crate::commands::common::report_commit_error;
use crate::error::CliError;

pub fn run_add(
    title: Option<&str>,
    description: Option<&str>,
    service: &NotebookService,
) -> Result<(), CliError> {
    let entry = service.add_entry(title, description)?;
    report_commit_error(service);

    println!("{}", entry.id);
    Ok(())
}
