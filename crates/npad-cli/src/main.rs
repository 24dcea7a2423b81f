//! NPad CLI - Command-line interface for entries and attachments

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::{open_service, resolve_config};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "npad=info,npad_core=info";

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return commands::completions::run_completions(*shell, output.as_deref());
    }

    let config = resolve_config(cli.db_path, cli.storage_root, cli.source_root);
    let service = open_service(&config)?;

    match command {
        Commands::Add { title, description } => {
            commands::add::run_add(title.as_deref(), description.as_deref(), &service)?;
        }
        Commands::Edit {
            id,
            title,
            description,
            clear_title,
            clear_description,
        } => {
            let changes = commands::edit::EditChanges {
                title,
                description,
                clear_title,
                clear_description,
            };
            commands::edit::run_edit(&id, changes, &service)?;
        }
        Commands::Delete { id } => commands::delete::run_delete(&id, &service)?,
        Commands::Show { id, json } => commands::show::run_show(&id, json, &service)?,
        Commands::List { json } => commands::list::run_list(json, &service)?,
        Commands::Attach { entry, files, json } => {
            commands::attach::run_attach(entry.as_deref(), &files, json, &service)?;
        }
        Commands::Export { output } => commands::export::run_export(output.as_deref(), &service)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
