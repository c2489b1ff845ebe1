//! On-disk record of files that passed their last check.
//!
//! One empty marker file per checked path, named after the path with its
//! separators flattened. Only the marker's modification time is read: an
//! entry is valid while it is strictly newer than the file it describes.
//! Entries are never removed, they simply go stale when the file changes.

use crate::error::{Error, Result};
use std::fs::{self, OpenOptions};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
    root: PathBuf,
}

impl ResultCache {
    /// Cache living under `dir` (one namespace per driver). Keys are derived
    /// from paths relative to `root`.
    pub fn new(dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            root: root.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Flat token for `path`: repo-relative, separators replaced by `%`.
    pub fn key(&self, path: &Path) -> String {
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let rel = pathdiff::diff_paths(&abs, &self.root).unwrap_or(abs);
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("%")
    }

    fn entry_path(&self, path: &Path) -> PathBuf {
        self.dir.join(self.key(path))
    }

    /// True when an entry exists and is newer than the file's mtime.
    pub fn is_valid(&self, path: &Path) -> bool {
        let entry = match mtime(&self.entry_path(path)) {
            Some(t) => t,
            None => return false,
        };
        let file = match mtime(&self.resolve(path)) {
            Some(t) => t,
            None => return false,
        };
        entry > file
    }

    /// Create or refresh the entry for `path` with the current time.
    pub fn record(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let entry = self.entry_path(path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&entry)
            .map_err(|e| Error::io(&entry, e))?;
        file.set_modified(SystemTime::now())
            .map_err(|e| Error::io(&entry, e))?;
        tracing::debug!(entry = %entry.display(), "cache entry recorded");
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn mtime(p: &Path) -> Option<SystemTime> {
    fs::metadata(p).ok()?.modified().ok()
}
