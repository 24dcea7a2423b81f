use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "npad")]
#[command(about = "Keep notes and their attached files from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory that receives copies of attached files
    #[arg(long, global = true, value_name = "PATH")]
    pub storage_root: Option<PathBuf>,

    /// Files under this directory are stored relative to it
    #[arg(long, global = true, value_name = "PATH")]
    pub source_root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new entry
    #[command(alias = "new")]
    Add {
        /// Entry title
        #[arg(short, long)]
        title: Option<String>,
        /// Entry description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change the title or description of an entry
    Edit {
        /// Entry ID or unique ID prefix
        id: String,
        /// New title
        #[arg(short, long, conflicts_with = "clear_title")]
        title: Option<String>,
        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the title
        #[arg(long)]
        clear_title: bool,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },
    /// Delete an entry (attached files stay on disk)
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
    },
    /// Show one entry with its attachments
    Show {
        /// Entry ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List entries
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach files to an entry, creating one when no entry is given
    Attach {
        /// Entry ID or unique ID prefix
        #[arg(short, long)]
        entry: Option<String>,
        /// Files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all entries as JSON
    Export {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
