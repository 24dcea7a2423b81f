//! Database layer for NPad

mod attachment_repository;
mod connection;
mod entry_repository;
mod gateway;
mod migrations;

pub use attachment_repository::{AttachmentBatch, AttachmentRepository, SqliteAttachmentRepository};
pub use connection::Database;
pub use entry_repository::{EntryRepository, SqliteEntryRepository};
pub use gateway::PersistenceGateway;
