//! Output rendering for driver runs.
//!
//! Supports `human` (default) and `json` outputs. Human output lists each
//! candidate in processing order, folds cache hits into a single `deja-vu`
//! line, and ends with a per-driver summary. The JSON form includes the
//! per-file entries, the counters, and the driver's exit status.

use crate::config::{OutputMode, RunConfig};
use crate::models::{Classification, RunSummary};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

/// Render a driver run as human-readable lines (no trailing newline).
pub fn render_human(run: &RunSummary, rc: &RunConfig) -> Vec<String> {
    let color = rc.color;
    let mut lines = Vec::new();
    for e in &run.results {
        let tag = match e.classification {
            Classification::Cached => continue,
            Classification::Passed => {
                if color {
                    "passed".green().bold().to_string()
                } else {
                    "passed".to_string()
                }
            }
            Classification::Failed => {
                if color {
                    "failed".red().bold().to_string()
                } else {
                    "failed".to_string()
                }
            }
            Classification::Skipped => {
                if color {
                    "skipped".bright_black().to_string()
                } else {
                    "skipped".to_string()
                }
            }
        };
        lines.push(format!("{} {}", tag, e.file));
    }
    if !run.summary.cached.is_empty() {
        let tag = if color {
            "deja-vu".cyan().bold().to_string()
        } else {
            "deja-vu".to_string()
        };
        lines.push(format!("{} {}", tag, run.summary.cached.join(" ")));
    }
    let summary = format!(
        "— {} — passed={} failed={} skipped={}",
        run.driver, run.summary.passed, run.summary.failed, run.summary.skipped
    );
    if color {
        lines.push(summary.bold().to_string());
    } else {
        lines.push(summary);
    }
    lines
}

/// Compose run JSON object (pure) for testing/snapshot purposes.
pub fn compose_run_json(run: &RunSummary, exit_code: u8) -> JsonVal {
    json!({
        "driver": run.driver,
        "results": run.results,
        "summary": run.summary,
        "exit_code": exit_code,
    })
}

/// Pretty-printed run JSON, as written to stdout.
pub fn render_run_json(run: &RunSummary, exit_code: u8) -> String {
    let out = compose_run_json(run, exit_code);
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
}

/// Print one driver run in the configured format.
pub fn print_run(run: &RunSummary, rc: &RunConfig, exit_code: u8) {
    match rc.output {
        OutputMode::Json => println!("{}", render_run_json(run, exit_code)),
        OutputMode::Human => {
            for line in render_human(run, rc) {
                println!("{}", line);
            }
        }
    }
}

/// Final multi-runner line in human mode.
pub fn render_overall(codes: &[(String, u8)], overall: u8, rc: &RunConfig) -> String {
    let parts: Vec<String> = codes.iter().map(|(d, c)| format!("{}={}", d, c)).collect();
    let line = format!("— overall — exit={} [{}]", overall, parts.join(", "));
    if rc.color {
        if overall == 0 {
            line.green().bold().to_string()
        } else {
            line.red().bold().to_string()
        }
    } else {
        line
    }
}
