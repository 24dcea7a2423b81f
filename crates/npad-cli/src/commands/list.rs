use npad_core::services::NotebookService;

use crate::commands::common::{entry_to_list_item, format_entry_lines, EntryListItem};
use crate::error::CliError;

pub fn run_list(as_json: bool, service: &NotebookService) -> Result<(), CliError> {
    let entries = service.fetch_entries()?;

    if as_json {
        let json_items = entries
            .iter()
            .map(entry_to_list_item)
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_entry_lines(&entries) {
            println!("{line}");
        }
    }

    Ok(())
}
