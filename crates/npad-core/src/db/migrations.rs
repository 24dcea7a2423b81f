//! Database migrations

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0);

    Ok(version)
}

/// Migration to version 1: entries and attachments
fn migrate_v1(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            title TEXT,
            description TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created_at);

        -- No ON DELETE CASCADE: entry deletion removes attachments explicitly.
        CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            entry_id TEXT NOT NULL REFERENCES entries(id),
            relative_path TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_type TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE (entry_id, relative_path)
        );
        CREATE INDEX IF NOT EXISTS idx_attachments_entry_id ON attachments(entry_id);
        CREATE INDEX IF NOT EXISTS idx_attachments_relative_path ON attachments(relative_path);

        INSERT INTO schema_version (version) VALUES (1);",
    )?;

    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
