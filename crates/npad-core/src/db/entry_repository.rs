//! Entry repository implementation

use crate::error::{Error, Result};
use crate::models::{Attachment, Entry, EntryId};

use super::PersistenceGateway;

/// Trait for entry storage operations
pub trait EntryRepository {
    /// Create a new entry with a fresh identifier and no attachments
    ///
    /// A rejected commit is logged and recorded on the gateway; the
    /// uncommitted entry is still returned.
    fn add_entry(&self, title: Option<&str>, description: Option<&str>) -> Result<Entry>;

    /// Replace an entry's title and description
    ///
    /// `None` clears the field. Pass the current value to keep it.
    fn update_entry(
        &self,
        id: &EntryId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Entry>;

    /// Delete an entry together with its attachment records
    ///
    /// Attachment files in the managed root are left on disk.
    fn delete_entry(&self, entry: &Entry) -> Result<()>;

    /// Get an entry by ID
    fn fetch_entry(&self, id: &EntryId) -> Result<Option<Entry>>;

    /// List all entries, oldest first
    fn fetch_entries(&self) -> Result<Vec<Entry>>;

    /// List the attachments of an entry
    fn list_attachments(&self, id: &EntryId) -> Result<Vec<Attachment>>;
}

/// `SQLite` implementation of `EntryRepository`
pub struct SqliteEntryRepository<'a> {
    gateway: &'a PersistenceGateway,
}

impl<'a> SqliteEntryRepository<'a> {
    /// Create a new repository over the given gateway
    pub const fn new(gateway: &'a PersistenceGateway) -> Self {
        Self { gateway }
    }

    /// Insert a new entry without committing
    pub(crate) fn stage_entry(
        &self,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Entry> {
        let entry = Entry::new(title.map(str::to_string), description.map(str::to_string));
        self.gateway.insert_entry(&entry)?;
        tracing::info!(entry_id = %entry.id, "Adding entry");
        Ok(entry)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn add_entry(&self, title: Option<&str>, description: Option<&str>) -> Result<Entry> {
        let entry = match self.stage_entry(title, description) {
            Ok(entry) => entry,
            Err(error) => {
                self.gateway.discard_pending_changes();
                return Err(error);
            }
        };

        self.gateway.commit_best_effort();
        Ok(entry)
    }

    fn update_entry(
        &self,
        id: &EntryId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Entry> {
        let Some(mut entry) = self.gateway.fetch_entry_by_id(id)? else {
            tracing::warn!(entry_id = %id, "Cannot update missing entry");
            return Err(Error::NotFound(id.to_string()));
        };

        entry.title = title.map(str::to_string);
        entry.description = description.map(str::to_string);
        entry.updated_at = chrono::Utc::now().timestamp_millis().max(entry.updated_at);

        match self.gateway.update_entry(&entry) {
            Ok(true) => {}
            Ok(false) => {
                self.gateway.discard_pending_changes();
                return Err(Error::NotFound(id.to_string()));
            }
            Err(error) => {
                self.gateway.discard_pending_changes();
                return Err(error);
            }
        }

        tracing::info!(entry_id = %id, "Updating entry");
        self.gateway.commit_best_effort();
        Ok(entry)
    }

    fn delete_entry(&self, entry: &Entry) -> Result<()> {
        let result = self
            .gateway
            .delete_attachments_for_entry(&entry.id)
            .and_then(|detached| Ok((detached, self.gateway.delete_entry(&entry.id)?)));

        let detached = match result {
            Ok((detached, true)) => detached,
            Ok((_, false)) => {
                self.gateway.discard_pending_changes();
                return Err(Error::NotFound(entry.id.to_string()));
            }
            Err(error) => {
                self.gateway.discard_pending_changes();
                return Err(error);
            }
        };

        tracing::info!(entry_id = %entry.id, detached, "Deleting entry from database");
        self.gateway.commit_best_effort();
        Ok(())
    }

    fn fetch_entry(&self, id: &EntryId) -> Result<Option<Entry>> {
        let entry = self.gateway.fetch_entry_by_id(id)?;
        tracing::debug!(entry_id = %id, found = entry.is_some(), "Fetched entry from database");
        Ok(entry)
    }

    fn fetch_entries(&self) -> Result<Vec<Entry>> {
        let entries = self.gateway.fetch_all_entries()?;
        tracing::debug!(count = entries.len(), "Fetched entries from database");
        Ok(entries)
    }

    fn list_attachments(&self, id: &EntryId) -> Result<Vec<Attachment>> {
        self.gateway.fetch_attachments(id)
    }
}
