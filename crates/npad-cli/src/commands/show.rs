use npad_core::export::entry_to_export_item;
use npad_core::services::NotebookService;

use crate::commands::common::resolve_entry;
use crate::error::CliError;

pub fn run_show(id: &str, as_json: bool, service: &NotebookService) -> Result<(), CliError> {
    let entry = resolve_entry(id, service)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entry_to_export_item(&entry))?);
        return Ok(());
    }

    println!("id:          {}", entry.id);
    println!("title:       {}", entry.title.as_deref().unwrap_or(""));
    if let Some(description) = &entry.description {
        println!();
        println!("{description}");
    }
    if !entry.attachments.is_empty() {
        println!();
        println!("attachments:");
        let root = service.content_store();
        for attachment in &entry.attachments {
            println!(
                "  {}  {}",
                attachment.file_name,
                root.destination_for(&attachment.relative_path).display()
            );
        }
    }
    Ok(())
}
