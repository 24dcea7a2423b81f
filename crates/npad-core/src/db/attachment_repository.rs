//! Attachment repository implementation

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::models::{Attachment, Entry, EntryId};
use crate::storage::{ContentStore, Placement};

use super::entry_repository::SqliteEntryRepository;
use super::PersistenceGateway;

/// Entry returned by an attachment batch, with one placement per distinct file
#[derive(Debug)]
pub struct AttachmentBatch {
    pub entry: Entry,
    pub placements: Vec<Placement>,
}

impl AttachmentBatch {
    /// Placements that did not reach the managed root
    pub fn failed(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|placement| placement.outcome.is_failed())
    }
}

/// Trait for attachment storage operations
pub trait AttachmentRepository {
    /// Attach files to an entry, creating a new entry when `entry_id` is `None`
    ///
    /// Fails before any record or file work when `entry_id` is unknown.
    /// Individual file placement failures are logged and do not fail the call.
    fn add_attachments(&self, entry_id: Option<&EntryId>, sources: &[PathBuf]) -> Result<Entry> {
        self.add_attachments_with_report(entry_id, sources)
            .map(|batch| batch.entry)
    }

    /// Same as [`Self::add_attachments`], also returning per-file outcomes
    fn add_attachments_with_report(
        &self,
        entry_id: Option<&EntryId>,
        sources: &[PathBuf],
    ) -> Result<AttachmentBatch>;
}

/// `SQLite`-backed attachment repository writing files through a [`ContentStore`]
pub struct SqliteAttachmentRepository<'a> {
    gateway: &'a PersistenceGateway,
    store: &'a ContentStore,
}

impl<'a> SqliteAttachmentRepository<'a> {
    /// Create a new repository over the given gateway and content store
    pub const fn new(gateway: &'a PersistenceGateway, store: &'a ContentStore) -> Self {
        Self { gateway, store }
    }

    fn resolve_entry(&self, entry_id: Option<&EntryId>) -> Result<Entry> {
        let Some(id) = entry_id else {
            return SqliteEntryRepository::new(self.gateway).stage_entry(None, None);
        };

        self.gateway.fetch_entry_by_id(id)?.ok_or_else(|| {
            tracing::error!(entry_id = %id, "Cannot add attachments to missing entry");
            Error::AttachmentTargetNotFound(id.to_string())
        })
    }

    /// Pair every distinct relative path with the first source that maps to it
    fn collect_sources(&self, sources: &[PathBuf]) -> Result<Vec<(String, PathBuf)>> {
        let mut seen = HashSet::new();
        let mut distinct = Vec::with_capacity(sources.len());
        for source in sources {
            let relative_path = self.store.relative_path(source)?;
            if seen.insert(relative_path.clone()) {
                distinct.push((relative_path, source.clone()));
            }
        }
        Ok(distinct)
    }

    /// Build and insert the records for paths the entry does not have yet
    fn record_attachments(
        &self,
        entry: &mut Entry,
        distinct: &[(String, PathBuf)],
    ) -> Result<()> {
        let mut added = Vec::new();
        for (relative_path, _) in distinct {
            if entry.attachment(relative_path).is_some() {
                continue;
            }

            let attachment = Attachment::new(entry.id, relative_path.as_str())?;
            if self.gateway.insert_attachment(&attachment)? {
                added.push(attachment);
            }
        }

        tracing::debug!(entry_id = %entry.id, added = added.len(), "Recorded attachments");
        entry.merge_attachments(added);
        Ok(())
    }
}

impl AttachmentRepository for SqliteAttachmentRepository<'_> {
    fn add_attachments_with_report(
        &self,
        entry_id: Option<&EntryId>,
        sources: &[PathBuf],
    ) -> Result<AttachmentBatch> {
        let recorded = self.resolve_entry(entry_id).and_then(|mut entry| {
            let distinct = self.collect_sources(sources)?;
            self.record_attachments(&mut entry, &distinct)?;
            Ok((entry, distinct))
        });

        let (entry, distinct) = match recorded {
            Ok(recorded) => recorded,
            Err(error) => {
                tracing::error!(
                    entry_id = ?entry_id.map(ToString::to_string),
                    files = sources.len(),
                    %error,
                    "Failed to add attachments"
                );
                self.gateway.discard_pending_changes();
                return Err(error);
            }
        };

        let placements: Vec<Placement> = distinct
            .into_iter()
            .map(|(relative_path, source)| self.store.place_at(&source, relative_path))
            .collect();

        let failed = placements
            .iter()
            .filter(|placement| placement.outcome.is_failed())
            .count();
        if failed > 0 {
            tracing::warn!(entry_id = %entry.id, failed, total = placements.len(), "Some attachments were not placed");
        }

        self.gateway.commit_best_effort();
        Ok(AttachmentBatch { entry, placements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EntryRepository;
    use crate::storage::PlacementOutcome;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        _dir: TempDir,
        sources: PathBuf,
        gateway: PersistenceGateway,
        store: ContentStore,
    }

    fn setup() -> Fixture {
        let dir = tempdir().unwrap();
        let sources = dir.path().join("sources");
        fs::create_dir_all(&sources).unwrap();
        let store = ContentStore::open(dir.path().join("managed"))
            .unwrap()
            .with_source_root(&sources);
        Fixture {
            _dir: dir,
            sources,
            gateway: PersistenceGateway::open_in_memory().unwrap(),
            store,
        }
    }

    fn write_source(fixture: &Fixture, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = fixture.sources.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    fn count_files(root: &Path) -> usize {
        fs::read_dir(root)
            .unwrap()
            .map(|entry| {
                let entry = entry.unwrap();
                if entry.file_type().unwrap().is_dir() {
                    count_files(&entry.path())
                } else {
                    1
                }
            })
            .sum()
    }

    fn attachment_rows(gateway: &PersistenceGateway) -> i64 {
        gateway
            .database()
            .connection()
            .query_row("SELECT COUNT(*) FROM attachments", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_add_attachments_creates_entry() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");
        let b = write_source(&fixture, "pics/b.png", b"beta");

        let entry = repo.add_attachments(None, &[a, b]).unwrap();

        let entries = SqliteEntryRepository::new(&fixture.gateway)
            .fetch_entries()
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);

        let paths: Vec<_> = entry
            .attachments
            .iter()
            .map(|a| a.relative_path.as_str())
            .collect();
        assert_eq!(paths, vec!["a.txt", "pics/b.png"]);
        assert!(entry.attachments.iter().all(|a| a.entry_id == entry.id));
        assert_eq!(entry.attachment("pics/b.png").unwrap().file_type, "png");

        assert_eq!(
            fs::read(fixture.store.destination_for("pics/b.png")).unwrap(),
            b"beta"
        );
        assert!(!fixture.gateway.has_pending_changes());
    }

    #[test]
    fn test_add_attachments_to_existing_entry_unions() {
        let fixture = setup();
        let entries = SqliteEntryRepository::new(&fixture.gateway);
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let entry = entries.add_entry(Some("Trip"), None).unwrap();
        let a = write_source(&fixture, "a.txt", b"alpha");
        let b = write_source(&fixture, "b.txt", b"beta");

        repo.add_attachments(Some(&entry.id), &[a.clone()]).unwrap();
        let updated = repo.add_attachments(Some(&entry.id), &[a, b]).unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.title.as_deref(), Some("Trip"));
        assert_eq!(updated.attachments.len(), 2);
        assert_eq!(entries.list_attachments(&entry.id).unwrap().len(), 2);
    }

    #[test]
    fn test_add_attachments_missing_entry_does_nothing() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");

        let missing = EntryId::new();
        let err = repo.add_attachments(Some(&missing), &[a]).unwrap_err();

        assert!(matches!(err, Error::AttachmentTargetNotFound(_)));
        assert_eq!(count_files(fixture.store.root()), 0);
        assert_eq!(attachment_rows(&fixture.gateway), 0);
        assert!(!fixture.gateway.has_pending_changes());
    }

    #[test]
    fn test_duplicate_sources_collapse() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");

        let batch = repo
            .add_attachments_with_report(None, &[a.clone(), a.clone(), a])
            .unwrap();

        assert_eq!(batch.entry.attachments.len(), 1);
        assert_eq!(batch.placements.len(), 1);
        assert_eq!(attachment_rows(&fixture.gateway), 1);
    }

    #[test]
    fn test_reattaching_same_file_skips_copy() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");

        let first = repo.add_attachments_with_report(None, &[a.clone()]).unwrap();
        assert!(matches!(first.placements[0].outcome, PlacementOutcome::Copied));

        let second = repo
            .add_attachments_with_report(Some(&first.entry.id), &[a.clone()])
            .unwrap();
        assert!(matches!(
            second.placements[0].outcome,
            PlacementOutcome::SkippedIdentical
        ));

        fs::write(&a, b"alpha, revised").unwrap();
        let third = repo
            .add_attachments_with_report(Some(&first.entry.id), &[a])
            .unwrap();
        assert!(matches!(third.placements[0].outcome, PlacementOutcome::Replaced));
        assert_eq!(third.entry.attachments.len(), 1);
        assert_eq!(
            fs::read(fixture.store.destination_for("a.txt")).unwrap(),
            b"alpha, revised"
        );
    }

    #[test]
    fn test_partial_failure_is_isolated() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");
        let b = write_source(&fixture, "blocked/b.txt", b"beta");
        let c = write_source(&fixture, "c.txt", b"gamma");
        fs::write(fixture.store.root().join("blocked"), b"in the way").unwrap();

        let batch = repo.add_attachments_with_report(None, &[a, b, c]).unwrap();

        let failed: Vec<_> = batch.failed().map(|p| p.relative_path.as_str()).collect();
        assert_eq!(failed, vec!["blocked/b.txt"]);
        assert!(batch.entry.attachment("a.txt").is_some());
        assert!(batch.entry.attachment("c.txt").is_some());
        assert_eq!(
            fs::read(fixture.store.destination_for("a.txt")).unwrap(),
            b"alpha"
        );
        assert_eq!(
            fs::read(fixture.store.destination_for("c.txt")).unwrap(),
            b"gamma"
        );

        let stored = SqliteEntryRepository::new(&fixture.gateway)
            .fetch_entry(&batch.entry.id)
            .unwrap()
            .unwrap();
        assert!(stored.attachment("a.txt").is_some());
        assert!(stored.attachment("c.txt").is_some());
    }

    #[test]
    fn test_invalid_source_aborts_before_any_work() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");

        let err = repo
            .add_attachments(None, &[a, PathBuf::from("../outside.txt")])
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(count_files(fixture.store.root()), 0);
        assert!(SqliteEntryRepository::new(&fixture.gateway)
            .fetch_entries()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_sources_are_never_modified() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");
        fs::create_dir_all(fixture.store.root()).unwrap();
        fs::write(fixture.store.destination_for("a.txt"), b"stale copy").unwrap();

        let batch = repo.add_attachments_with_report(None, &[a.clone()]).unwrap();

        assert!(matches!(batch.placements[0].outcome, PlacementOutcome::Replaced));
        assert_eq!(fs::read(&a).unwrap(), b"alpha");
    }

    #[test]
    fn test_record_path_matches_placed_file() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let padded = write_source(&fixture, "draft.txt ", b"padded");
        let plain = write_source(&fixture, "draft.txt", b"plain");

        let batch = repo
            .add_attachments_with_report(None, &[padded, plain])
            .unwrap();

        assert_eq!(batch.entry.attachments.len(), 2);
        assert_eq!(batch.placements.len(), 2);
        for placement in &batch.placements {
            let record = batch.entry.attachment(&placement.relative_path).unwrap();
            assert_eq!(record.relative_path, placement.relative_path);
            assert!(fixture.store.destination_for(&record.relative_path).is_file());
        }
        assert_eq!(
            fs::read(fixture.store.destination_for("draft.txt ")).unwrap(),
            b"padded"
        );
        assert_eq!(
            fs::read(fixture.store.destination_for("draft.txt")).unwrap(),
            b"plain"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_source_aborts_before_any_work() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let first = fixture.sources.join(OsStr::from_bytes(b"\xff.txt"));
        let second = fixture.sources.join(OsStr::from_bytes(b"\xfe.txt"));
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();

        let err = repo
            .add_attachments_with_report(None, &[first, second])
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(count_files(fixture.store.root()), 0);
        assert_eq!(attachment_rows(&fixture.gateway), 0);
        assert!(!fixture.gateway.has_pending_changes());
    }

    #[test]
    fn test_rejected_commit_still_returns_entry() {
        let fixture = setup();
        let repo = SqliteAttachmentRepository::new(&fixture.gateway, &fixture.store);
        let a = write_source(&fixture, "a.txt", b"alpha");

        fixture
            .gateway
            .database()
            .connection()
            .execute_batch("BEGIN; PRAGMA defer_foreign_keys = ON")
            .unwrap();
        let orphan = Attachment::new(EntryId::new(), "orphan.txt").unwrap();
        fixture.gateway.insert_attachment(&orphan).unwrap();

        let entry = repo.add_attachments(None, &[a]).unwrap();

        assert!(entry.attachment("a.txt").is_some());
        assert!(matches!(
            fixture.gateway.take_commit_error(),
            Some(Error::CommitFailed(_))
        ));
        assert!(!fixture.gateway.has_pending_changes());
        assert!(SqliteEntryRepository::new(&fixture.gateway)
            .fetch_entry(&entry.id)
            .unwrap()
            .is_none());
        assert_eq!(attachment_rows(&fixture.gateway), 0);
    }
}
