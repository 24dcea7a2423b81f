//! Notebook service: the store context handed to clients.

use std::path::PathBuf;

use crate::config::NotebookConfig;
use crate::db::{
    AttachmentBatch, AttachmentRepository, Database, EntryRepository, PersistenceGateway,
    SqliteAttachmentRepository, SqliteEntryRepository,
};
use crate::models::{Attachment, Entry, EntryId};
use crate::storage::ContentStore;
use crate::{Error, Result};

/// Owns the persistence gateway and the content store for one process.
///
/// Construct it once at startup and pass it to whatever needs entries.
pub struct NotebookService {
    gateway: PersistenceGateway,
    store: ContentStore,
}

impl NotebookService {
    /// Open the database and managed storage root described by `config`.
    pub fn open(config: &NotebookConfig) -> Result<Self> {
        let db = match &config.database_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        Error::DirectoryCreateFailed {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                Database::open(path)?
            }
            None => {
                tracing::info!("Running with an in-memory database");
                Database::open_in_memory()?
            }
        };

        let mut store = ContentStore::open(&config.storage_root)?;
        if let Some(source_root) = &config.source_root {
            store = store.with_source_root(source_root);
        }

        Ok(Self::new(PersistenceGateway::new(db), store))
    }

    /// Assemble a service from already opened parts.
    pub const fn new(gateway: PersistenceGateway, store: ContentStore) -> Self {
        Self { gateway, store }
    }

    pub const fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub const fn content_store(&self) -> &ContentStore {
        &self.store
    }

    fn entries(&self) -> SqliteEntryRepository<'_> {
        SqliteEntryRepository::new(&self.gateway)
    }

    fn attachments(&self) -> SqliteAttachmentRepository<'_> {
        SqliteAttachmentRepository::new(&self.gateway, &self.store)
    }

    /// Create a new entry.
    pub fn add_entry(&self, title: Option<&str>, description: Option<&str>) -> Result<Entry> {
        self.entries().add_entry(title, description)
    }

    /// Replace an entry's title and description.
    pub fn update_entry(
        &self,
        id: &EntryId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Entry> {
        self.entries().update_entry(id, title, description)
    }

    /// Delete an entry and its attachment records.
    pub fn delete_entry(&self, entry: &Entry) -> Result<()> {
        self.entries().delete_entry(entry)
    }

    /// Fetch an entry by id.
    pub fn fetch_entry(&self, id: &EntryId) -> Result<Option<Entry>> {
        self.entries().fetch_entry(id)
    }

    /// List all entries.
    pub fn fetch_entries(&self) -> Result<Vec<Entry>> {
        self.entries().fetch_entries()
    }

    /// List attachments of an entry.
    pub fn list_attachments(&self, id: &EntryId) -> Result<Vec<Attachment>> {
        self.entries().list_attachments(id)
    }

    /// Attach files to an entry, creating one when `entry_id` is `None`.
    pub fn add_attachments(&self, entry_id: Option<&EntryId>, sources: &[PathBuf]) -> Result<Entry> {
        self.attachments().add_attachments(entry_id, sources)
    }

    /// Attach files and report the outcome of every placement.
    pub fn add_attachments_with_report(
        &self,
        entry_id: Option<&EntryId>,
        sources: &[PathBuf],
    ) -> Result<AttachmentBatch> {
        self.attachments()
            .add_attachments_with_report(entry_id, sources)
    }

    /// Most recent commit failure since the last call.
    pub fn take_commit_error(&self) -> Option<Error> {
        self.gateway.take_commit_error()
    }
}
