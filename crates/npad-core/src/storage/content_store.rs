//! Content store that mirrors attachment files into the managed storage root.
//!
//! Every placement is decided by comparing bytes: a missing destination is
//! copied, an identical destination is left alone, and a differing destination
//! is replaced atomically through a temporary file in the same directory.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Result of placing one source file into the managed root.
#[derive(Debug)]
pub enum PlacementOutcome {
    /// Destination did not exist and was created from the source.
    Copied,
    /// Destination existed with different bytes and was replaced.
    Replaced,
    /// Destination already held identical bytes.
    SkippedIdentical,
    /// Placement was aborted; the destination is unchanged.
    Failed(Error),
}

impl PlacementOutcome {
    /// Short label used in logs and CLI output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Replaced => "replaced",
            Self::SkippedIdentical => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-file placement report.
#[derive(Debug)]
pub struct Placement {
    /// Source file as given by the caller.
    pub source: PathBuf,
    /// Path of the file relative to the managed root.
    pub relative_path: String,
    /// Absolute destination inside the managed root.
    pub destination: PathBuf,
    pub outcome: PlacementOutcome,
}

/// Filesystem store rooted at the managed storage directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    source_root: Option<PathBuf>,
}

impl ContentStore {
    /// Open a store at `root`, creating the directory if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| {
            tracing::error!(directory = %root.display(), error = %source, "Failed to create storage root");
            Error::DirectoryCreateFailed {
                path: root.clone(),
                source,
            }
        })?;

        Ok(Self {
            root,
            source_root: None,
        })
    }

    /// Resolve source paths relative to `source_root` when they live under it.
    #[must_use]
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(source_root.into());
        self
    }

    /// Managed storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the `/`-separated location of `source` inside the managed root.
    ///
    /// Sources under the configured source root lose that prefix; any other
    /// source keeps its full path minus the filesystem root.
    pub fn relative_path(&self, source: &Path) -> Result<String> {
        let trimmed = self
            .source_root
            .as_deref()
            .and_then(|base| source.strip_prefix(base).ok())
            .unwrap_or(source);

        let mut parts = Vec::new();
        for component in trimmed.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "Attachment path is not valid UTF-8: {}",
                            source.display()
                        ))
                    })?;
                    parts.push(part.to_string());
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    return Err(Error::InvalidInput(format!(
                        "Attachment path must not contain '..': {}",
                        source.display()
                    )));
                }
            }
        }

        if parts.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Attachment path has no file name: {}",
                source.display()
            )));
        }

        Ok(parts.join("/"))
    }

    /// Absolute destination for a relative path inside the managed root.
    pub fn destination_for(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Copy, replace, or skip `source` into its mirrored destination.
    ///
    /// Never returns an error: failures are reported as
    /// [`PlacementOutcome::Failed`] so callers can keep placing other files.
    pub fn place(&self, source: &Path) -> Placement {
        match self.relative_path(source) {
            Ok(relative_path) => self.place_at(source, relative_path),
            Err(error) => {
                tracing::error!(source = %source.display(), %error, "Cannot place attachment");
                Placement {
                    source: source.to_path_buf(),
                    relative_path: String::new(),
                    destination: self.root.clone(),
                    outcome: PlacementOutcome::Failed(error),
                }
            }
        }
    }

    pub(crate) fn place_at(&self, source: &Path, relative_path: String) -> Placement {
        let destination = self.destination_for(&relative_path);
        let outcome = match Self::try_place(source, &destination) {
            Ok(outcome) => outcome,
            Err(error) => PlacementOutcome::Failed(error),
        };

        match &outcome {
            PlacementOutcome::Failed(error) => tracing::error!(
                destination = %destination.display(),
                %error,
                "Failed to place attachment"
            ),
            outcome => tracing::info!(
                destination = %destination.display(),
                outcome = outcome.label(),
                "Placed attachment"
            ),
        }

        Placement {
            source: source.to_path_buf(),
            relative_path,
            destination,
            outcome,
        }
    }

    fn try_place(source: &Path, destination: &Path) -> Result<PlacementOutcome> {
        ensure_parent_dir(destination)?;

        if !destination.try_exists()? {
            copy_new(source, destination).map_err(|source_error| Error::FileCopyFailed {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                source: source_error,
            })?;
            return Ok(PlacementOutcome::Copied);
        }

        tracing::debug!(destination = %destination.display(), "File exists at destination");
        if contents_equal(source, destination)? {
            return Ok(PlacementOutcome::SkippedIdentical);
        }

        replace_existing(source, destination).map_err(|source_error| {
            Error::FileReplaceFailed {
                from: source.to_path_buf(),
                to: destination.to_path_buf(),
                source: source_error,
            }
        })?;
        Ok(PlacementOutcome::Replaced)
    }
}

fn ensure_parent_dir(destination: &Path) -> Result<()> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }

    // create_dir_all tolerates another writer creating the same chain.
    fs::create_dir_all(parent).map_err(|source| {
        tracing::error!(directory = %parent.display(), error = %source, "Failed to create directory");
        Error::DirectoryCreateFailed {
            path: parent.to_path_buf(),
            source,
        }
    })?;

    tracing::info!(directory = %parent.display(), "Created directory");
    Ok(())
}

/// Byte-for-byte comparison, short-circuiting on length.
fn contents_equal(left: &Path, right: &Path) -> io::Result<bool> {
    let left_file = File::open(left)?;
    let right_file = File::open(right)?;
    if left_file.metadata()?.len() != right_file.metadata()?.len() {
        return Ok(false);
    }

    let mut left_reader = BufReader::new(left_file);
    let mut right_reader = BufReader::new(right_file);
    loop {
        let left_buf = left_reader.fill_buf()?;
        let right_buf = right_reader.fill_buf()?;
        if left_buf.is_empty() || right_buf.is_empty() {
            return Ok(left_buf.is_empty() && right_buf.is_empty());
        }

        let len = left_buf.len().min(right_buf.len());
        if left_buf[..len] != right_buf[..len] {
            return Ok(false);
        }
        left_reader.consume(len);
        right_reader.consume(len);
    }
}

/// Write the source bytes to a temporary file next to `destination`.
fn stage_copy(source: &Path, destination: &Path) -> io::Result<NamedTempFile> {
    let parent = destination
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?;

    let mut source_file = File::open(source)?;
    let permissions = source_file.metadata()?.permissions();

    let mut staged = NamedTempFile::new_in(parent)?;
    io::copy(&mut source_file, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.as_file().set_permissions(permissions)?;
    Ok(staged)
}

fn copy_new(source: &Path, destination: &Path) -> io::Result<()> {
    let staged = stage_copy(source, destination)?;
    staged
        .persist_noclobber(destination)
        .map_err(|error| error.error)?;
    Ok(())
}

fn replace_existing(source: &Path, destination: &Path) -> io::Result<()> {
    let staged = stage_copy(source, destination)?;
    staged.persist(destination).map_err(|error| error.error)?;
    Ok(())
}
