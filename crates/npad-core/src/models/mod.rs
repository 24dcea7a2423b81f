//! Data models for NPad

mod attachment;
mod entry;

pub use attachment::{Attachment, AttachmentId};
pub use entry::{Entry, EntryId};
