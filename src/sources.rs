//! File listings fed into the drivers.
//!
//! Either the git index (all tracked files, or only staged additions and
//! modifications) or newline-separated paths read from a stream.

use crate::error::{Error, Result};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `git ls-files`
    Tracked,
    /// `git diff --cached`, added/copied/modified/renamed only.
    Staged,
}

impl Listing {
    pub fn from_staged_flag(staged: bool) -> Self {
        if staged {
            Listing::Staged
        } else {
            Listing::Tracked
        }
    }

    fn git_args(&self) -> &'static [&'static str] {
        match self {
            Listing::Tracked => &["ls-files", "-z"],
            Listing::Staged => &["diff", "--cached", "--name-only", "-z", "--diff-filter=ACMR"],
        }
    }
}

/// Ask git for repo-relative paths under `root`.
pub fn git_files(root: &Path, listing: Listing) -> Result<Vec<PathBuf>> {
    let out = Command::new("git")
        .args(listing.git_args())
        .current_dir(root)
        .output()
        .map_err(|e| Error::FileListing {
            message: format!("failed to run git: {}", e),
        })?;
    if !out.status.success() {
        return Err(Error::FileListing {
            message: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(split_nul(&out.stdout))
}

fn split_nul(raw: &[u8]) -> Vec<PathBuf> {
    raw.split(|b| *b == 0)
        .filter(|s| !s.is_empty())
        .map(|s| PathBuf::from(String::from_utf8_lossy(s).as_ref()))
        .collect()
}

/// One path per line; blank lines and surrounding whitespace are ignored.
pub fn read_paths<R: BufRead>(reader: R) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| Error::io("<stdin>", e))?;
        let t = line.trim();
        if !t.is_empty() {
            paths.push(PathBuf::from(t));
        }
    }
    Ok(paths)
}
