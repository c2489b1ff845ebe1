//! optlint core library.
//!
//! Directive-driven lint orchestration: files opt into a linter with a
//! header comment, the linter runs only on those files, passing results can
//! be cached, and all outcomes fold into one CI exit code.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `directive`: Header directive scanning.
//! - `classify`: Candidate selection by extension or content sniffing.
//! - `cache`: Modification-time based result cache.
//! - `invoke`: External tool probing and execution.
//! - `driver`: Per-linter specs and the selective lint pipeline.
//! - `runner`: Multi-driver sequencing and exit code aggregation.
//! - `sources`: File listings from git or stdin.
//! - `models`: Candidate, classification, and run summary types.
//! - `output`: Human/JSON printers.
//! - `error`: Error type and exit codes.
//! - `utils`: Supporting helpers.
pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod directive;
pub mod driver;
pub mod error;
pub mod invoke;
pub mod models;
pub mod output;
pub mod runner;
pub mod sources;
pub mod utils;
