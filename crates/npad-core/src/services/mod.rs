//! Shared services used by clients.

mod notebook;

pub use notebook::NotebookService;
