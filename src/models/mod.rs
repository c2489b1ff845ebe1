//! Shared data models for driver runs and their printed/JSON summaries.

pub mod settings;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// The family of files a driver cares about.
pub enum LinterKind {
    Python,
    Shell,
    Yaml,
}

impl LinterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinterKind::Python => "python",
            LinterKind::Shell => "shell",
            LinterKind::Yaml => "yaml",
        }
    }
}

impl fmt::Display for LinterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Opt-in signal parsed from a file's leading comment block.
pub enum Directive {
    Absent,
    Present,
    PresentWithOptions(Vec<String>),
}

impl Directive {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Directive::Absent)
    }

    /// Extra tool arguments carried by the directive, if any.
    pub fn options(&self) -> &[String] {
        match self {
            Directive::PresentWithOptions(opts) => opts,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A file under consideration by one driver.
pub struct Candidate {
    pub path: PathBuf,
    pub kind: LinterKind,
    pub options: Vec<String>,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, kind: LinterKind) -> Self {
        Self {
            path: path.into(),
            kind,
            options: Vec::new(),
        }
    }

    pub fn display(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Outcome of one candidate in one run. `Cached` counts as skipped.
pub enum Classification {
    Passed,
    Failed,
    Skipped,
    Cached,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Passed => "passed",
            Classification::Failed => "failed",
            Classification::Skipped => "skipped",
            Classification::Cached => "cached",
        }
    }
}

/// Process exit status: no failures.
pub const EXIT_OK: u8 = 0;
/// At least one candidate failed its lint.
pub const EXIT_LINT_FAILED: u8 = 1;
/// Harness misconfiguration (no candidates, bad config, listing failure).
pub const EXIT_CONFIG: u8 = 2;
/// A required tool is not installed.
pub const EXIT_TOOL_MISSING: u8 = 3;

#[derive(Debug, Clone, Serialize)]
/// One processed candidate.
pub struct Entry {
    pub file: String,
    pub kind: LinterKind,
    pub classification: Classification,
}

#[derive(Debug, Default, Clone, Serialize)]
/// Aggregated counters; `cached` paths are also counted in `skipped`.
pub struct Counts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cached: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
/// Per-driver run record: entries in processing order plus counters.
pub struct RunSummary {
    pub driver: String,
    pub results: Vec<Entry>,
    pub summary: Counts,
    /// Set when an enabled candidate failed because its tool was absent.
    pub tool_missing: bool,
}

impl RunSummary {
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            results: Vec::new(),
            summary: Counts::default(),
            tool_missing: false,
        }
    }

    /// Append one classification and update the running counts.
    pub fn record(&mut self, candidate: &Candidate, classification: Classification) {
        let file = candidate.display();
        match classification {
            Classification::Passed => self.summary.passed += 1,
            Classification::Failed => self.summary.failed += 1,
            Classification::Skipped => self.summary.skipped += 1,
            Classification::Cached => {
                self.summary.skipped += 1;
                self.summary.cached.push(file.clone());
            }
        }
        self.results.push(Entry {
            file,
            kind: candidate.kind,
            classification,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Exit status for this run. When `require_candidates` is set an empty
    /// run is a configuration problem rather than a silent success.
    pub fn exit_code(&self, require_candidates: bool) -> u8 {
        if self.summary.failed > 0 {
            if self.tool_missing {
                EXIT_TOOL_MISSING
            } else {
                EXIT_LINT_FAILED
            }
        } else if require_candidates && self.is_empty() {
            EXIT_CONFIG
        } else {
            EXIT_OK
        }
    }
}
