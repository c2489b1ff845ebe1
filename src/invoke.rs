//! External lint tool execution.
//!
//! The [`Invoker`] turns one enabled candidate into `passed` or `failed`.
//! Tool availability is probed once per run with a `--version` query; an
//! absent tool is reported once on stderr and then fails every enabled
//! candidate of that run instead of skipping it.

use crate::models::Classification;
use crate::utils;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of probing a tool before the first invocation.
pub enum ToolStatus {
    Available,
    /// Not resolvable on the search path.
    Missing,
    /// Present, but the version query did not succeed.
    Unusable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully-resolved command line for one candidate.
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Capability to probe and run external tools.
pub trait ToolRunner {
    fn probe(&self, program: &str) -> ToolStatus;
    /// Run to completion with inherited stdio, returning the exit code
    /// (`None` when terminated by a signal).
    fn run(&self, cmd: &ToolCommand) -> io::Result<Option<i32>>;
}

/// Spawns real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn probe(&self, program: &str) -> ToolStatus {
        let out = Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();
        match out {
            Ok(o) if o.status.success() => ToolStatus::Available,
            Ok(o) => ToolStatus::Unusable(String::from_utf8_lossy(&o.stderr).trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ToolStatus::Missing,
            Err(e) => ToolStatus::Unusable(e.to_string()),
        }
    }

    fn run(&self, cmd: &ToolCommand) -> io::Result<Option<i32>> {
        let status = Command::new(&cmd.program)
            .args(&cmd.args)
            .current_dir(&cmd.cwd)
            .stdin(Stdio::null())
            .status()?;
        Ok(status.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// What happens to enabled candidates when the tool is not installed.
pub enum MissingToolPolicy {
    /// Warn once, then classify every enabled candidate as failed.
    #[default]
    WarnAndFail,
}

/// Per-run invocation state for one tool.
pub struct Invoker<'r> {
    runner: &'r dyn ToolRunner,
    program: String,
    color: bool,
    policy: MissingToolPolicy,
    status: Option<ToolStatus>,
    warnings: usize,
}

impl<'r> Invoker<'r> {
    pub fn new(runner: &'r dyn ToolRunner, program: &str, color: bool) -> Self {
        Self {
            runner,
            program: program.to_string(),
            color,
            policy: MissingToolPolicy::default(),
            status: None,
            warnings: 0,
        }
    }

    pub fn with_policy(mut self, policy: MissingToolPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Probe lazily so runs where nothing is enabled never touch the tool.
    pub fn status(&mut self) -> &ToolStatus {
        if self.status.is_none() {
            let st = self.runner.probe(&self.program);
            tracing::debug!(tool = %self.program, status = ?st, "probed tool");
            self.status = Some(st);
        }
        self.status.get_or_insert(ToolStatus::Missing)
    }

    /// Availability warnings emitted so far; at most one per run.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// True once the probe has reported the tool as not installed.
    pub fn tool_missing(&self) -> bool {
        matches!(self.status, Some(ToolStatus::Missing))
    }

    /// Run the tool on `file` with `args` placed before the path.
    pub fn invoke(&mut self, file: &Path, args: &[String], cwd: &Path) -> Classification {
        match self.status().clone() {
            ToolStatus::Available => {}
            ToolStatus::Missing => match self.policy {
                MissingToolPolicy::WarnAndFail => {
                    if self.warnings == 0 {
                        self.warnings += 1;
                        eprintln!(
                            "{} {} is not installed; every enabled file will fail",
                            utils::warn_prefix(self.color),
                            self.program
                        );
                    }
                    return Classification::Failed;
                }
            },
            ToolStatus::Unusable(reason) => {
                if self.warnings == 0 {
                    self.warnings += 1;
                    tracing::warn!(tool = %self.program, %reason, "tool version query failed");
                }
                return Classification::Failed;
            }
        }

        let mut full: Vec<String> = args.to_vec();
        full.push(file.to_string_lossy().to_string());
        let cmd = ToolCommand {
            program: self.program.clone(),
            args: full,
            cwd: cwd.to_path_buf(),
        };
        tracing::debug!(program = %cmd.program, args = ?cmd.args, "spawning");
        match self.runner.run(&cmd) {
            Ok(Some(0)) => Classification::Passed,
            Ok(code) => {
                tracing::debug!(file = %file.display(), ?code, "tool reported failure");
                Classification::Failed
            }
            Err(e) => {
                eprintln!(
                    "{} failed to run {}: {}",
                    utils::error_prefix(self.color),
                    self.program,
                    e
                );
                Classification::Failed
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;

    #[test]
    fn test_exit_status_maps_to_classification() {
        let fake = FakeRunner::available().failing("bad.sh", 1);
        let mut inv = Invoker::new(&fake, "shellcheck", false);
        let cwd = Path::new(".");
        assert_eq!(inv.invoke(Path::new("ok.sh"), &[], cwd), Classification::Passed);
        assert_eq!(inv.invoke(Path::new("bad.sh"), &[], cwd), Classification::Failed);
        assert_eq!(*fake.probes.borrow(), 1);
    }

    #[test]
    fn test_args_precede_file() {
        let fake = FakeRunner::available();
        let mut inv = Invoker::new(&fake, "pylint", false);
        inv.invoke(
            Path::new("a.py"),
            &["--rcfile=.pylintrc".to_string()],
            Path::new("/r"),
        );
        let calls = fake.calls.borrow();
        assert_eq!(calls[0].program, "pylint");
        assert_eq!(calls[0].args, vec!["--rcfile=.pylintrc".to_string(), "a.py".to_string()]);
        assert_eq!(calls[0].cwd, PathBuf::from("/r"));
    }

    #[test]
    fn test_missing_tool_fails_every_candidate_without_running() {
        let fake = FakeRunner::with_status(ToolStatus::Missing);
        let mut inv = Invoker::new(&fake, "shellcheck", false);
        let cwd = Path::new(".");
        assert_eq!(inv.invoke(Path::new("a.sh"), &[], cwd), Classification::Failed);
        assert_eq!(inv.invoke(Path::new("b.sh"), &[], cwd), Classification::Failed);
        assert!(inv.tool_missing());
        assert_eq!(fake.call_count(), 0);
        assert_eq!(*fake.probes.borrow(), 1);
    }

    #[test]
    fn test_missing_tool_warns_once_per_run() {
        let fake = FakeRunner::with_status(ToolStatus::Missing);
        let mut inv = Invoker::new(&fake, "pylint", false);
        assert_eq!(inv.warnings(), 0);
        let cwd = Path::new(".");
        inv.invoke(Path::new("a.py"), &[], cwd);
        assert_eq!(inv.warnings(), 1);
        inv.invoke(Path::new("b.py"), &[], cwd);
        inv.invoke(Path::new("c.py"), &[], cwd);
        assert_eq!(inv.warnings(), 1);
    }

    #[test]
    fn test_available_tool_never_warns() {
        let fake = FakeRunner::available().failing("a.sh", 1);
        let mut inv = Invoker::new(&fake, "shellcheck", false);
        inv.invoke(Path::new("a.sh"), &[], Path::new("."));
        assert_eq!(inv.warnings(), 0);
    }

    #[test]
    fn test_unusable_tool_fails_but_is_not_missing() {
        let fake = FakeRunner::with_status(ToolStatus::Unusable("old".into()));
        let mut inv = Invoker::new(&fake, "yamllint", false);
        assert_eq!(
            inv.invoke(Path::new("a.yml"), &[], Path::new(".")),
            Classification::Failed
        );
        assert!(!inv.tool_missing());
        inv.invoke(Path::new("b.yml"), &[], Path::new("."));
        assert_eq!(inv.warnings(), 1);
    }

    #[test]
    fn test_process_runner_reports_missing_binary() {
        let st = ProcessRunner.probe("optlint-definitely-not-a-real-tool");
        assert_eq!(st, ToolStatus::Missing);
    }
}
