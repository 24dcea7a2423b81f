use std::fs;
use std::path::PathBuf;

use clap::Parser;
use npad_core::config::NotebookConfig;
use npad_core::services::NotebookService;
use npad_core::storage::{Placement, PlacementOutcome};
use npad_core::Entry;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::cli::{Cli, Commands, CompletionShell};
use crate::commands::attach::run_attach;
use crate::commands::common::{
    format_entry_lines, format_placement_line, format_relative_time, normalize_entry_identifier,
    placement_to_item, resolve_config, resolve_entry, short_id,
};
use crate::commands::completions::render_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditChanges};
use crate::commands::export::run_export;
use crate::error::CliError;

fn memory_service(dir: &tempfile::TempDir) -> NotebookService {
    NotebookService::open(&NotebookConfig::in_memory(dir.path().join("files"))).unwrap()
}

#[test]
fn normalize_entry_identifier_trims_and_rejects_empty() {
    assert_eq!(normalize_entry_identifier("  0192abc ").unwrap(), "0192abc");
    assert!(matches!(
        normalize_entry_identifier("   "),
        Err(CliError::EmptyEntryId)
    ));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn format_entry_lines_counts_files() {
    let mut entry = Entry::new(Some("Scans".into()), None);
    entry.merge_attachments([
        npad_core::Attachment::new(entry.id, "a.jpg").unwrap(),
        npad_core::Attachment::new(entry.id, "b.jpg").unwrap(),
    ]);
    let plain = Entry::new(Some("Plain".into()), None);

    let lines = format_entry_lines(&[entry.clone(), plain]);
    assert!(lines[0].starts_with(&short_id(&entry.id)));
    assert!(lines[0].contains("Scans"));
    assert!(lines[0].ends_with("2 files"));
    assert!(lines[1].ends_with("just now"));
}

#[test]
fn placement_items_carry_failure_message() {
    let failed = Placement {
        source: PathBuf::from("/in/a.txt"),
        relative_path: "a.txt".into(),
        destination: PathBuf::from("/out/a.txt"),
        outcome: PlacementOutcome::Failed(npad_core::Error::InvalidInput("boom".into())),
    };
    let item = placement_to_item(&failed);
    assert_eq!(item.outcome, "failed");
    assert_eq!(item.error.as_deref(), Some("Invalid input: boom"));
    assert!(format_placement_line(&failed).contains("boom"));

    let copied = Placement {
        outcome: PlacementOutcome::Copied,
        ..failed
    };
    assert!(placement_to_item(&copied).error.is_none());
    assert_eq!(format_placement_line(&copied), "copied    /out/a.txt");
}

#[test]
fn resolve_config_prefers_flags() {
    let config = resolve_config(
        Some(PathBuf::from("/tmp/flag.db")),
        Some(PathBuf::from("/tmp/files")),
        Some(PathBuf::from("/home/me")),
    );
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/flag.db")));
    assert_eq!(config.storage_root, PathBuf::from("/tmp/files"));
    assert_eq!(config.source_root, Some(PathBuf::from("/home/me")));
}

#[test]
fn resolve_entry_by_full_id_and_prefix() {
    let dir = tempdir().unwrap();
    let service = memory_service(&dir);
    let entry = service.add_entry(Some("Find me"), None).unwrap();

    let by_id = resolve_entry(&entry.id.to_string(), &service).unwrap();
    assert_eq!(by_id.id, entry.id);

    let prefix: String = entry.id.to_string().chars().take(30).collect();
    let by_prefix = resolve_entry(&prefix.to_uppercase(), &service).unwrap();
    assert_eq!(by_prefix.id, entry.id);

    assert!(matches!(
        resolve_entry("ffffffff-ffff", &service),
        Err(CliError::EntryNotFound(_))
    ));
}

#[test]
fn resolve_entry_rejects_ambiguous_prefix() {
    let dir = tempdir().unwrap();
    let service = memory_service(&dir);
    service.add_entry(Some("one"), None).unwrap();
    service.add_entry(Some("two"), None).unwrap();

    // UUID v7 ids start with the creation timestamp, so both begin with "0"
    let err = resolve_entry("0", &service).unwrap_err();
    assert!(matches!(err, CliError::AmbiguousEntryId(_)));
}

#[test]
fn edit_changes_keep_unset_fields() {
    let entry = Entry::new(Some("Title".into()), Some("Body".into()));

    let (title, description) = EditChanges {
        title: Some("New".into()),
        ..EditChanges::default()
    }
    .apply(&entry);
    assert_eq!(title.as_deref(), Some("New"));
    assert_eq!(description.as_deref(), Some("Body"));

    let (title, description) = EditChanges {
        clear_description: true,
        ..EditChanges::default()
    }
    .apply(&entry);
    assert_eq!(title.as_deref(), Some("Title"));
    assert!(description.is_none());
}

#[test]
fn run_edit_and_delete_update_store() {
    let dir = tempdir().unwrap();
    let service = memory_service(&dir);
    let entry = service.add_entry(Some("Draft"), Some("text")).unwrap();

    run_edit(
        &entry.id.to_string(),
        EditChanges {
            title: Some("Final".into()),
            ..EditChanges::default()
        },
        &service,
    )
    .unwrap();
    let edited = service.fetch_entry(&entry.id).unwrap().unwrap();
    assert_eq!(edited.title.as_deref(), Some("Final"));
    assert_eq!(edited.description.as_deref(), Some("text"));

    run_delete(&entry.id.to_string(), &service).unwrap();
    assert!(service.fetch_entry(&entry.id).unwrap().is_none());
}

#[test]
fn run_attach_copies_files_and_reports_failures() {
    let dir = tempdir().unwrap();
    let sources = dir.path().join("inbox");
    fs::create_dir_all(&sources).unwrap();
    let good = sources.join("good.txt");
    fs::write(&good, b"ok").unwrap();

    let config = NotebookConfig::in_memory(dir.path().join("files")).with_source_root(&sources);
    let service = NotebookService::open(&config).unwrap();

    run_attach(None, &[good], false, &service).unwrap();
    assert_eq!(service.fetch_entries().unwrap().len(), 1);
    assert_eq!(
        fs::read(service.content_store().destination_for("good.txt")).unwrap(),
        b"ok"
    );

    let missing = sources.join("missing.txt");
    let err = run_attach(None, &[missing], true, &service).unwrap_err();
    assert!(matches!(
        err,
        CliError::PlacementFailed {
            failed: 1,
            total: 1
        }
    ));
    assert!(matches!(
        run_attach(None, &[], false, &service),
        Err(CliError::NoFiles)
    ));
}

#[test]
fn run_export_writes_json_file() {
    let dir = tempdir().unwrap();
    let service = memory_service(&dir);
    service.add_entry(Some("Exported"), None).unwrap();

    let output = dir.path().join("export.json");
    run_export(Some(&output), &service).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(parsed[0]["title"], "Exported");
}

#[test]
fn cli_parses_attach_command() {
    let cli = Cli::try_parse_from(["npad", "attach", "--entry", "0192", "a.txt", "b.txt"]).unwrap();
    match cli.command {
        Some(Commands::Attach { entry, files, json }) => {
            assert_eq!(entry.as_deref(), Some("0192"));
            assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
            assert!(!json);
        }
        _ => panic!("expected attach command"),
    }

    assert!(Cli::try_parse_from(["npad", "attach"]).is_err());
    assert!(Cli::try_parse_from(["npad", "edit", "x", "--title", "t", "--clear-title"]).is_err());
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("npad"));
}

#[test]
fn default_log_filter_covers_binary_and_core() {
    let binary = module_path!().split("::").next().unwrap();
    let targets: Vec<&str> = crate::DEFAULT_LOG_FILTER
        .split(',')
        .filter_map(|directive| directive.split('=').next())
        .collect();
    assert!(targets.contains(&binary));
    assert!(targets.contains(&"npad_core"));
}
