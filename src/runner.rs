//! Multi-runner: every enabled driver in sequence, worst exit code wins.
//!
//! A driver that cannot even be configured is reported and scored as a
//! configuration error; the remaining drivers still run.

use crate::classify::Sniffer;
use crate::config::{Effective, RunConfig};
use crate::driver::{run_driver, DriverContext, DriverSpec, BUILTIN_DRIVERS};
use crate::invoke::ToolRunner;
use crate::models::{RunSummary, EXIT_CONFIG, EXIT_OK};
use crate::output;
use crate::utils;
use std::path::PathBuf;

/// Result of one multi-runner pass.
pub struct MultiOutcome {
    pub runs: Vec<RunSummary>,
    /// Exit code per attempted driver, in execution order.
    pub codes: Vec<(String, u8)>,
    pub exit_code: u8,
}

/// Drop listing entries matched by the configured `exclude` globs.
pub fn filter_excluded(eff: &Effective, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if eff.exclude.is_empty() {
        return paths;
    }
    paths
        .into_iter()
        .filter(|p| {
            let excluded = eff.is_excluded(p);
            if excluded {
                tracing::debug!(file = %p.display(), "excluded by config");
            }
            !excluded
        })
        .collect()
}

/// Drivers the multi-runner will attempt, honoring `skip`.
pub fn selected_drivers(eff: &Effective) -> Vec<&'static str> {
    BUILTIN_DRIVERS
        .iter()
        .copied()
        .filter(|name| !eff.skip.iter().any(|s| s == name))
        .collect()
}

/// Run all selected drivers over `paths`, printing each run as it finishes.
pub fn run_all(
    eff: &Effective,
    rc: RunConfig,
    paths: &[PathBuf],
    runner: &dyn ToolRunner,
    sniffer: &dyn Sniffer,
) -> MultiOutcome {
    let ctx = DriverContext::from_effective(eff, rc);
    let mut runs = Vec::new();
    let mut codes = Vec::new();
    let mut exit_code = EXIT_OK;

    for name in selected_drivers(eff) {
        let spec = match DriverSpec::builtin(name)
            .map(|s| s.with_settings(&eff.driver_settings(name)))
        {
            Some(Ok(spec)) => spec,
            Some(Err(e)) => {
                eprintln!("{} {}: {}", utils::error_prefix(rc.color), name, e);
                codes.push((name.to_string(), e.exit_code()));
                exit_code = exit_code.max(e.exit_code());
                continue;
            }
            None => continue,
        };
        tracing::info!(driver = name, "running driver");
        let run = run_driver(&spec, paths, &ctx, runner, sniffer);
        let code = run.exit_code(false);
        output::print_run(&run, &rc, code);
        codes.push((name.to_string(), code));
        exit_code = exit_code.max(code);
        runs.push(run);
    }

    if runs.iter().all(RunSummary::is_empty) {
        eprintln!(
            "{} no candidate files found for any driver",
            utils::error_prefix(rc.color)
        );
        exit_code = exit_code.max(EXIT_CONFIG);
    }

    MultiOutcome {
        runs,
        codes,
        exit_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ShebangSniffer;
    use crate::config::{resolve_effective, OutputMode};
    use crate::invoke::testing::FakeRunner;
    use crate::invoke::ToolStatus;
    use crate::models::{EXIT_LINT_FAILED, EXIT_TOOL_MISSING};
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn repo(files: &[(&str, &str)], config: Option<&str>) -> (TempDir, Effective) {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        for (rel, body) in files {
            let p = dir.path().join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, body).unwrap();
        }
        if let Some(cfg) = config {
            fs::write(dir.path().join("optlint.toml"), cfg).unwrap();
        }
        let eff = resolve_effective(dir.path().to_str(), None, &|_| None).unwrap();
        (dir, eff)
    }

    fn listing(files: &[&str]) -> Vec<PathBuf> {
        files.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_all_pass_is_zero() {
        let (_d, eff) = repo(
            &[("a.py", "# pylint:\n"), ("b.sh", "echo\n"), ("c.yml", "# yamllint\n")],
            None,
        );
        let fake = FakeRunner::available();
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Human),
            &listing(&["a.py", "b.sh", "c.yml"]),
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.exit_code, EXIT_OK);
        assert_eq!(out.runs.len(), 3);
        assert_eq!(fake.call_count(), 2);
    }

    #[test]
    fn test_max_exit_code_across_drivers() {
        let (_d, eff) = repo(
            &[("a.py", "# pylint:\n"), ("c.yml", "# yamllint\n")],
            None,
        );
        let fake = FakeRunner::available().failing("c.yml", 1);
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Json),
            &listing(&["a.py", "c.yml"]),
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.exit_code, EXIT_LINT_FAILED);
        assert_eq!(
            out.codes,
            vec![
                ("pylint".to_string(), 0),
                ("shellcheck".to_string(), 0),
                ("yamllint".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_missing_tool_outranks_lint_failure() {
        let (_d, eff) = repo(&[("s.sh", "# shellcheck\n")], None);
        let fake = FakeRunner::with_status(ToolStatus::Missing);
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Human),
            &listing(&["s.sh"]),
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.exit_code, EXIT_TOOL_MISSING);
    }

    #[test]
    fn test_no_candidates_anywhere_is_config_error() {
        let (_d, eff) = repo(&[("README.md", "# hi\n")], None);
        let fake = FakeRunner::available();
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Human),
            &listing(&["README.md"]),
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.exit_code, EXIT_CONFIG);
    }

    #[test]
    fn test_skip_and_exclude_from_config() {
        let (_d, eff) = repo(
            &[("a.py", "# pylint:\n"), ("vendor/v.py", "# pylint:\n")],
            Some("skip = [\"yamllint\", \"shellcheck\"]\nexclude = [\"vendor/**\"]\n"),
        );
        assert_eq!(selected_drivers(&eff), vec!["pylint"]);
        let paths = filter_excluded(&eff, listing(&["a.py", "vendor/v.py"]));
        assert_eq!(paths, listing(&["a.py"]));
        let fake = FakeRunner::available();
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Human),
            &paths,
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.runs.len(), 1);
        assert_eq!(out.exit_code, EXIT_OK);
    }

    #[test]
    fn test_bad_driver_settings_do_not_stop_other_drivers() {
        let (_d, eff) = repo(
            &[("c.yml", "# yamllint\n")],
            Some("[drivers.pylint]\ntool = \"\"\n"),
        );
        let fake = FakeRunner::available();
        let out = run_all(
            &eff,
            RunConfig::plain(OutputMode::Human),
            &listing(&["c.yml"]),
            &fake,
            &ShebangSniffer,
        );
        assert_eq!(out.codes[0], ("pylint".to_string(), EXIT_CONFIG));
        assert_eq!(out.runs.len(), 2);
        assert_eq!(fake.call_count(), 1);
        assert_eq!(out.exit_code, EXIT_CONFIG);
    }
}
