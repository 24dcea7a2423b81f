//! Managed attachment file storage.

mod content_store;

pub use content_store::{ContentStore, Placement, PlacementOutcome};
