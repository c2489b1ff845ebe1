//! Error types and exit codes for optlint.

use crate::models::EXIT_CONFIG;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("could not list files: {message}")]
    FileListing { message: String },

    #[error("no candidate files found")]
    NoCandidates,

    #[error("{0}")]
    Usage(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map to the process exit status.
    ///
    /// Every harness error is a setup problem (2); lint failures are only
    /// ever reported through a run summary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. }
            | Self::ConfigParse { .. }
            | Self::FileListing { .. }
            | Self::NoCandidates
            | Self::Usage(_) => EXIT_CONFIG,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_harness_errors_are_setup_failures() {
        let stdin = Error::io("<stdin>", io::Error::new(io::ErrorKind::InvalidData, "bad"));
        assert_eq!(stdin.exit_code(), EXIT_CONFIG);
        assert_eq!(Error::NoCandidates.exit_code(), EXIT_CONFIG);
        assert_eq!(Error::Usage("x".into()).exit_code(), EXIT_CONFIG);
        assert_ne!(stdin.exit_code(), crate::models::EXIT_LINT_FAILED);
    }

    #[test]
    fn test_io_message_names_path() {
        let e = Error::io("a/b.py", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(e.to_string(), "failed to read a/b.py: gone");
    }
}
