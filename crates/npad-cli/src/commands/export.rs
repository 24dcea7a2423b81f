use std::path::Path;

use npad_core::export::render_json_export;
use npad_core::services::NotebookService;

use crate::error::CliError;

pub fn run_export(output_path: Option<&Path>, service: &NotebookService) -> Result<(), CliError> {
    let entries = service.fetch_entries()?;
    let rendered = render_json_export(&entries)?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
