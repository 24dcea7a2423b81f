//! npad-core - Core library for NPad
//!
//! This crate contains the entry and attachment models, the `SQLite`
//! persistence layer, and the managed content store that keeps attachment
//! files on disk in sync with their database records.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;
mod util;

pub use error::{Error, Result};
pub use models::{Attachment, AttachmentId, Entry, EntryId};
