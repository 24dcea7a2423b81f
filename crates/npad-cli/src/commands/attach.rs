use std::path::{Path, PathBuf};

use npad_core::services::NotebookService;

use crate::commands::common::{
    format_placement_line, placement_to_item, report_commit_error, resolve_entry, PlacementItem,
};
use crate::error::CliError;

pub fn run_attach(
    entry_query: Option<&str>,
    files: &[PathBuf],
    as_json: bool,
    service: &NotebookService,
) -> Result<(), CliError> {
    if files.is_empty() {
        return Err(CliError::NoFiles);
    }

    let entry_id = entry_query
        .map(|query| resolve_entry(query, service).map(|entry| entry.id))
        .transpose()?;

    let files = files.iter().map(|file| absolutize(file)).collect::<Vec<_>>();
    let batch = service.add_attachments_with_report(entry_id.as_ref(), &files)?;
    report_commit_error(service);

    if as_json {
        let items = batch
            .placements
            .iter()
            .map(placement_to_item)
            .collect::<Vec<PlacementItem>>();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "entry_id": batch.entry.id.to_string(),
                "placements": items,
            }))?
        );
    } else {
        println!("{}", batch.entry.id);
        for placement in &batch.placements {
            println!("{}", format_placement_line(placement));
        }
    }

    let failed = batch.failed().count();
    if failed > 0 {
        return Err(CliError::PlacementFailed {
            failed,
            total: batch.placements.len(),
        });
    }
    Ok(())
}

/// Relative command-line paths are taken from the current directory.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}
