//! Configuration discovery and effective settings resolution.
//!
//! optlint reads `optlint.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags and environment variables
//! to produce an `Effective` config.
//! Defaults:
//! - `cache_dir`: `.optlint-cache` (relative to the repository root)
//! - `output`: `human`
//! - `skip`, `exclude`: empty
//!
//! Overrides precedence: CLI > environment > config file > defaults.

use crate::error::{Error, Result};
use crate::models::settings::DriverSettings;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "OPTLINT_CACHE_DIR";
pub const DEFAULT_CACHE_DIR: &str = ".optlint-cache";

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `optlint.toml|yaml`.
pub struct OptlintConfig {
    pub cache_dir: Option<String>,
    pub output: Option<String>,
    /// Drivers the multi-runner leaves out.
    #[serde(default)]
    pub skip: Vec<String>,
    /// Glob patterns (repo-relative) removed from every file listing.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub drivers: HashMap<String, DriverSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(OutputMode::Human),
            "json" => Ok(OutputMode::Json),
            other => Err(Error::Usage(format!(
                "unknown output mode '{}' (expected human|json)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Immutable per-process rendering settings, decided once at startup.
pub struct RunConfig {
    pub color: bool,
    pub output: OutputMode,
}

impl RunConfig {
    pub fn detect(output: OutputMode, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let color = output == OutputMode::Human
            && env("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        Self { color, output }
    }

    pub fn plain(output: OutputMode) -> Self {
        Self {
            color: false,
            output,
        }
    }
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub cache_dir: PathBuf,
    pub output: OutputMode,
    pub skip: Vec<String>,
    pub exclude: Vec<glob::Pattern>,
    pub drivers: HashMap<String, DriverSettings>,
    /// Tool rc-file environment overrides, captured at resolution time.
    pub rc_env: HashMap<String, String>,
    pub config_found: bool,
}

impl Effective {
    pub fn driver_settings(&self, name: &str) -> DriverSettings {
        self.drivers.get(name).cloned().unwrap_or_default()
    }

    /// True if the repo-relative form of `path` matches an exclude pattern.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let rel = if path.is_absolute() {
            pathdiff::diff_paths(path, &self.repo_root).unwrap_or_else(|| path.to_path_buf())
        } else {
            path.to_path_buf()
        };
        self.exclude.iter().any(|p| p.matches_path(&rel))
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `optlint.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => return start.to_path_buf(),
        }
    }
}

const CONFIG_NAMES: [&str; 3] = ["optlint.toml", "optlint.yaml", "optlint.yml"];

/// Load `OptlintConfig` from `optlint.toml` or `optlint.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<OptlintConfig>> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let cfg = if name.ends_with(".toml") {
            toml::from_str::<OptlintConfig>(&s).map_err(|e| Error::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str::<OptlintConfig>(&s).map_err(|e| Error::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Environment variables consulted for tool rc-file overrides.
pub const RC_ENV_VARS: [&str; 3] = ["PYLINTRC", "SHELLCHECKRC", "YAMLLINT_CONFIG_FILE"];

/// Resolve `Effective` by merging CLI flags, environment, config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<Effective> {
    let start = absolutize(Path::new(cli_repo_root.unwrap_or(".")));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let cache_dir = env(CACHE_DIR_ENV)
        .filter(|s| !s.is_empty())
        .or(cfg.cache_dir)
        .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string());
    let cache_dir = {
        let p = PathBuf::from(cache_dir);
        if p.is_absolute() {
            p
        } else {
            repo_root.join(p)
        }
    };

    let output = OutputMode::parse(
        cli_output
            .map(str::to_string)
            .or(cfg.output)
            .as_deref()
            .unwrap_or("human"),
    )?;

    let mut exclude = Vec::new();
    for pat in &cfg.exclude {
        let compiled = glob::Pattern::new(pat).map_err(|e| Error::ConfigParse {
            path: repo_root.clone(),
            message: format!("bad exclude pattern '{}': {}", pat, e),
        })?;
        exclude.push(compiled);
    }

    let rc_env = RC_ENV_VARS
        .iter()
        .filter_map(|k| env(*k).filter(|v| !v.is_empty()).map(|v| (k.to_string(), v)))
        .collect();

    Ok(Effective {
        repo_root,
        cache_dir,
        output,
        skip: cfg.skip,
        exclude,
        drivers: cfg.drivers,
        rc_env,
        config_found,
    })
}

/// Anchor a relative path at the current directory without resolving
/// symlinks; `.` components are dropped.
fn absolutize(p: &Path) -> PathBuf {
    let joined = if p.is_absolute() {
        p.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(p),
            Err(_) => p.to_path_buf(),
        }
    };
    joined.components().collect()
}

/// Environment lookup backed by the real process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        let eff = resolve_effective(root.to_str(), None, &no_env).unwrap();
        assert!(!eff.config_found);
        assert_eq!(eff.repo_root, root);
        assert_eq!(eff.cache_dir, root.join(".optlint-cache"));
        assert_eq!(eff.output, OutputMode::Human);
        assert!(eff.skip.is_empty());
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("optlint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
cache_dir = "build/lint-cache"
output = "json"
skip = ["yamllint"]
exclude = ["vendor/**"]
[drivers.pylint]
tool = "python3 -m pylint"
cache = false
args = ["--score=n"]
            "#
        )
        .unwrap();
        fs::create_dir_all(root.join("sub/dir")).unwrap();

        let start = root.join("sub/dir");
        let eff = resolve_effective(start.to_str(), None, &no_env).unwrap();
        assert!(eff.config_found);
        assert_eq!(eff.repo_root, root);
        assert_eq!(eff.cache_dir, root.join("build/lint-cache"));
        assert_eq!(eff.output, OutputMode::Json);
        assert_eq!(eff.skip, vec!["yamllint".to_string()]);
        assert!(eff.is_excluded(Path::new("vendor/x/a.py")));
        assert!(!eff.is_excluded(Path::new("src/a.py")));
        let py = eff.driver_settings("pylint");
        assert_eq!(py.cache, Some(false));
        assert_eq!(py.args, vec!["--score=n".to_string()]);
        assert_eq!(eff.driver_settings("shellcheck"), DriverSettings::default());
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("optlint.yaml"),
            "output: human\nskip:\n  - shellcheck\ndrivers:\n  yamllint:\n    rc: ci/yamllint.yml\n",
        )
        .unwrap();
        let eff = resolve_effective(root.to_str(), None, &no_env).unwrap();
        assert_eq!(eff.skip, vec!["shellcheck".to_string()]);
        assert_eq!(
            eff.driver_settings("yamllint").rc.as_deref(),
            Some("ci/yamllint.yml")
        );
    }

    #[test]
    fn test_precedence_cli_env_over_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("optlint.toml"), "cache_dir = \"a\"\noutput = \"json\"\n").unwrap();
        let env = |k: &str| match k {
            CACHE_DIR_ENV => Some("/tmp/optlint-env-cache".to_string()),
            "PYLINTRC" => Some("ci/pylintrc".to_string()),
            _ => None,
        };
        let eff = resolve_effective(root.to_str(), Some("human"), &env).unwrap();
        assert_eq!(eff.cache_dir, PathBuf::from("/tmp/optlint-env-cache"));
        assert_eq!(eff.output, OutputMode::Human);
        assert_eq!(eff.rc_env.get("PYLINTRC").map(String::as_str), Some("ci/pylintrc"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("optlint.toml"), "skip = 3\n").unwrap();
        let err = resolve_effective(root.to_str(), None, &no_env).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert_eq!(err.exit_code(), crate::models::EXIT_CONFIG);
    }

    #[test]
    fn test_unknown_output_mode_is_usage_error() {
        let dir = tempdir().unwrap();
        let err = resolve_effective(dir.path().to_str(), Some("xml"), &no_env).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_run_config_no_color_env() {
        let env = |k: &str| (k == "NO_COLOR").then(|| "1".to_string());
        assert!(!RunConfig::detect(OutputMode::Human, &env).color);
        assert!(!RunConfig::detect(OutputMode::Json, &no_env).color);
    }
}
