//! Persistence gateway over the `SQLite` backing store
//!
//! Mutations open a transaction lazily; nothing becomes visible to other
//! connections until [`PersistenceGateway::commit_pending_changes`] runs.

use std::cell::RefCell;
use std::collections::HashMap;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Attachment, AttachmentId, Entry, EntryId};

use super::Database;

const ENTRY_COLUMNS: &str = "id, title, description, created_at, updated_at";
const ATTACHMENT_COLUMNS: &str = "id, entry_id, relative_path, file_name, file_type, created_at";

/// Single store context shared by the entry and attachment repositories
pub struct PersistenceGateway {
    db: Database,
    commit_error: RefCell<Option<Error>>,
}

impl PersistenceGateway {
    /// Wrap an opened database
    pub const fn new(db: Database) -> Self {
        Self {
            db,
            commit_error: RefCell::new(None),
        }
    }

    /// Gateway over a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Underlying database
    pub const fn database(&self) -> &Database {
        &self.db
    }

    fn conn(&self) -> &Connection {
        self.db.connection()
    }

    /// Whether mutations are waiting for a commit
    pub fn has_pending_changes(&self) -> bool {
        !self.conn().is_autocommit()
    }

    fn begin_if_needed(&self) -> Result<()> {
        if self.conn().is_autocommit() {
            self.conn().execute_batch("BEGIN")?;
        }
        Ok(())
    }

    /// Commit pending changes.
    ///
    /// Returns `Ok(false)` without touching the store when nothing is pending.
    /// A rejected commit rolls the pending changes back.
    pub fn commit_pending_changes(&self) -> Result<bool> {
        if !self.has_pending_changes() {
            return Ok(false);
        }

        if let Err(error) = self.conn().execute_batch("COMMIT") {
            tracing::error!(%error, "Failed to commit pending changes");
            if let Err(rollback_error) = self.conn().execute_batch("ROLLBACK") {
                tracing::error!(error = %rollback_error, "Failed to roll back rejected commit");
            }
            return Err(Error::CommitFailed(error.to_string()));
        }

        tracing::info!("Saved changes in database");
        Ok(true)
    }

    /// Commit pending changes, recording a failure instead of returning it.
    ///
    /// The recorded failure can be read back with [`Self::take_commit_error`].
    pub fn commit_best_effort(&self) -> bool {
        match self.commit_pending_changes() {
            Ok(_) => true,
            Err(error) => {
                *self.commit_error.borrow_mut() = Some(error);
                false
            }
        }
    }

    /// Take the most recent commit failure, if any
    pub fn take_commit_error(&self) -> Option<Error> {
        self.commit_error.borrow_mut().take()
    }

    /// Drop pending changes without committing them
    pub fn discard_pending_changes(&self) {
        if self.has_pending_changes() {
            if let Err(error) = self.conn().execute_batch("ROLLBACK") {
                tracing::error!(%error, "Failed to discard pending changes");
            } else {
                tracing::debug!("Discarded pending changes");
            }
        }
    }

    /// Fetch an entry and its attachments by id
    pub fn fetch_entry_by_id(&self, id: &EntryId) -> Result<Option<Entry>> {
        let result = self.conn().query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?"),
            params![id.as_str()],
            parse_entry,
        );

        let mut entry = match result {
            Ok(entry) => entry,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        entry.attachments = self.fetch_attachments(id)?;
        Ok(Some(entry))
    }

    /// Fetch all entries, oldest first, with their attachments
    pub fn fetch_all_entries(&self) -> Result<Vec<Entry>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY created_at ASC, id ASC"
        ))?;
        let mut entries = stmt
            .query_map([], parse_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments ORDER BY relative_path ASC"
        ))?;
        let mut by_entry: HashMap<EntryId, Vec<Attachment>> = HashMap::new();
        for attachment in stmt.query_map([], parse_attachment)? {
            let attachment = attachment?;
            by_entry
                .entry(attachment.entry_id)
                .or_default()
                .push(attachment);
        }

        for entry in &mut entries {
            entry.attachments = by_entry.remove(&entry.id).unwrap_or_default();
        }
        Ok(entries)
    }

    /// Fetch the attachments of one entry, ordered by relative path
    pub fn fetch_attachments(&self, entry_id: &EntryId) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM attachments WHERE entry_id = ? ORDER BY relative_path ASC"
        ))?;
        let attachments = stmt
            .query_map(params![entry_id.as_str()], parse_attachment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attachments)
    }

    /// Insert an entry row (attachments are inserted separately)
    pub fn insert_entry(&self, entry: &Entry) -> Result<()> {
        self.begin_if_needed()?;
        self.conn().execute(
            "INSERT INTO entries (id, title, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![
                entry.id.as_str(),
                entry.title,
                entry.description,
                entry.created_at,
                entry.updated_at
            ],
        )?;
        Ok(())
    }

    /// Overwrite an entry's title, description and update time.
    ///
    /// Returns `false` when no such entry exists.
    pub fn update_entry(&self, entry: &Entry) -> Result<bool> {
        self.begin_if_needed()?;
        let rows = self.conn().execute(
            "UPDATE entries SET title = ?, description = ?, updated_at = ? WHERE id = ?",
            params![
                entry.title,
                entry.description,
                entry.updated_at,
                entry.id.as_str()
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete an entry row. Returns `false` when no such entry exists.
    ///
    /// Attachment rows must be removed first.
    pub fn delete_entry(&self, id: &EntryId) -> Result<bool> {
        self.begin_if_needed()?;
        let rows = self
            .conn()
            .execute("DELETE FROM entries WHERE id = ?", params![id.as_str()])?;
        Ok(rows > 0)
    }

    /// Insert an attachment row.
    ///
    /// Returns `false` when the entry already has an attachment at that path.
    pub fn insert_attachment(&self, attachment: &Attachment) -> Result<bool> {
        self.begin_if_needed()?;
        let rows = self.conn().execute(
            "INSERT OR IGNORE INTO attachments (id, entry_id, relative_path, file_name, file_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                attachment.id.as_str(),
                attachment.entry_id.as_str(),
                attachment.relative_path,
                attachment.file_name,
                attachment.file_type,
                attachment.created_at
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete every attachment row owned by an entry
    pub fn delete_attachments_for_entry(&self, entry_id: &EntryId) -> Result<usize> {
        self.begin_if_needed()?;
        let rows = self.conn().execute(
            "DELETE FROM attachments WHERE entry_id = ?",
            params![entry_id.as_str()],
        )?;
        Ok(rows)
    }
}

fn parse_uuid_column<T>(row: &Row<'_>, index: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = uuid::Error>,
{
    let raw: String = row.get(index)?;
    raw.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

fn parse_entry(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: parse_uuid_column::<EntryId>(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        attachments: Vec::new(),
    })
}

fn parse_attachment(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: parse_uuid_column::<AttachmentId>(row, 0)?,
        entry_id: parse_uuid_column::<EntryId>(row, 1)?,
        relative_path: row.get(2)?,
        file_name: row.get(3)?,
        file_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}
