//! Selective lint driver.
//!
//! A [`DriverSpec`] bundles everything that differs between linters: which
//! files are candidates, which header directive opts a file in, whether
//! passing results are cached, and how the tool is called. [`run_driver`]
//! pushes a file listing through the same pipeline for every spec:
//!
//! classify → scan directive → cache check → invoke → cache update → record
//!
//! Candidates are processed strictly one after another.

use crate::cache::ResultCache;
use crate::classify::{Matcher, Sniffer};
use crate::config::{Effective, RunConfig};
use crate::directive::DirectiveRule;
use crate::error::{Error, Result};
pub use crate::invoke::MissingToolPolicy;
use crate::invoke::{Invoker, ToolRunner};
use crate::models::settings::DriverSettings;
use crate::models::{Candidate, Classification, Directive, LinterKind, RunSummary};
use crate::utils;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the rc-file path is handed to the tool.
pub enum RcFlag {
    /// Single argument, e.g. `--rcfile=<path>`.
    Joined(&'static str),
    /// Flag followed by the path, e.g. `-c <path>`.
    Separate(&'static str),
}

#[derive(Debug, Clone)]
/// Tool config-file lookup: environment first, then settings, then a
/// default file used only when it exists.
pub struct RcFile {
    pub env: &'static str,
    pub default: Option<&'static str>,
    pub flag: RcFlag,
}

#[derive(Debug, Clone)]
/// Configuration of one selective-lint driver.
pub struct DriverSpec {
    pub name: String,
    pub matcher: Matcher,
    pub directive: DirectiveRule,
    pub use_cache: bool,
    pub missing_tool: MissingToolPolicy,
    /// Program followed by any fixed leading arguments.
    pub tool: Vec<String>,
    pub rc: RcFile,
    pub rc_override: Option<String>,
    pub args: Vec<String>,
    /// Treat every candidate as opted in, ignoring directives.
    pub lint_all: bool,
}

/// Names of the built-in drivers, in multi-runner order.
pub const BUILTIN_DRIVERS: [&str; 3] = ["pylint", "shellcheck", "yamllint"];

impl DriverSpec {
    /// Python files by extension or interpreter; `# pylint:` opts in and
    /// `# pylint-args: ...` lines add tool arguments. Results are cached.
    pub fn pylint() -> Self {
        Self {
            name: "pylint".into(),
            matcher: builtin_matcher(LinterKind::Python, r"^py$", true),
            directive: builtin_rule(r"^#\s*pylint:", Some(r"^#\s*pylint-args:\s*(.*?)\s*$")),
            use_cache: true,
            missing_tool: MissingToolPolicy::WarnAndFail,
            tool: vec!["pylint".into()],
            rc: RcFile {
                env: "PYLINTRC",
                default: Some(".pylintrc"),
                flag: RcFlag::Joined("--rcfile="),
            },
            rc_override: None,
            args: Vec::new(),
            lint_all: false,
        }
    }

    /// Shell scripts by extension; `# shellcheck` (optionally followed by
    /// `key=value` directives) opts in.
    pub fn shellcheck() -> Self {
        Self {
            name: "shellcheck".into(),
            matcher: builtin_matcher(LinterKind::Shell, r"^(?:sh|bash)$", false),
            directive: builtin_rule(r"^#\s*shellcheck(\s+[a-z][a-z-]*=\S+)*\s*$", None),
            use_cache: false,
            missing_tool: MissingToolPolicy::WarnAndFail,
            tool: vec!["shellcheck".into()],
            rc: RcFile {
                env: "SHELLCHECKRC",
                default: None,
                flag: RcFlag::Joined("--rcfile="),
            },
            rc_override: None,
            args: Vec::new(),
            lint_all: false,
        }
    }

    /// YAML files (`y*ml`); `# yamllint` alone or with a yamllint comment
    /// directive (`disable`, `enable rule:...`) opts in.
    pub fn yamllint() -> Self {
        Self {
            name: "yamllint".into(),
            matcher: builtin_matcher(LinterKind::Yaml, r"^y.*ml$", false),
            directive: builtin_rule(
                r"^#\s*yamllint(\s+(disable|enable)(-line)?(\s+rule:\S+)*)?\s*$",
                None,
            ),
            use_cache: false,
            missing_tool: MissingToolPolicy::WarnAndFail,
            tool: vec!["yamllint".into()],
            rc: RcFile {
                env: "YAMLLINT_CONFIG_FILE",
                default: Some(".yamllint"),
                flag: RcFlag::Separate("-c"),
            },
            rc_override: None,
            args: Vec::new(),
            lint_all: false,
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "pylint" => Some(Self::pylint()),
            "shellcheck" => Some(Self::shellcheck()),
            "yamllint" => Some(Self::yamllint()),
            _ => None,
        }
    }

    /// Apply `[drivers.<name>]` overrides from the config file.
    pub fn with_settings(mut self, s: &DriverSettings) -> Result<Self> {
        if let Some(tool) = s.tool.as_ref() {
            let parts: Vec<String> = tool.split_whitespace().map(str::to_string).collect();
            if parts.is_empty() {
                return Err(Error::Usage(format!("[drivers.{}].tool is empty", self.name)));
            }
            self.tool = parts;
        }
        if let Some(exts) = s.extensions.as_ref() {
            self.matcher = Matcher::from_extensions(self.matcher.kind, exts, self.matcher.sniff)
                .map_err(|e| Error::Usage(format!("[drivers.{}].extensions: {}", self.name, e)))?;
        }
        if let Some(cache) = s.cache {
            self.use_cache = cache;
        }
        self.rc_override = s.rc.clone();
        self.args = s.args.clone();
        Ok(self)
    }

    pub fn program(&self) -> &str {
        self.tool.first().map(String::as_str).unwrap_or(&self.name)
    }

    /// Resolve the rc-file argument(s), if any applies.
    fn rc_args(&self, root: &Path, rc_env: &HashMap<String, String>) -> Vec<String> {
        let path = rc_env
            .get(self.rc.env)
            .cloned()
            .or_else(|| self.rc_override.clone())
            .or_else(|| {
                self.rc
                    .default
                    .filter(|d| root.join(d).is_file())
                    .map(str::to_string)
            });
        match (path, self.rc.flag) {
            (None, _) => Vec::new(),
            (Some(p), RcFlag::Joined(prefix)) => vec![format!("{}{}", prefix, p)],
            (Some(p), RcFlag::Separate(flag)) => vec![flag.to_string(), p],
        }
    }

    /// Arguments placed before the file path for one candidate.
    fn command_args(
        &self,
        root: &Path,
        rc_env: &HashMap<String, String>,
        options: &[String],
    ) -> Vec<String> {
        let mut args: Vec<String> = self.tool.iter().skip(1).cloned().collect();
        args.extend(self.rc_args(root, rc_env));
        args.extend(self.args.iter().cloned());
        args.extend(options.iter().cloned());
        args
    }
}

fn builtin_matcher(kind: LinterKind, ext: &str, sniff: bool) -> Matcher {
    match Matcher::new(kind, ext, sniff) {
        Ok(m) => m,
        Err(e) => unreachable!("built-in extension pattern is valid: {}", e),
    }
}

fn builtin_rule(enable: &str, options: Option<&str>) -> DirectiveRule {
    match DirectiveRule::new(enable, options) {
        Ok(r) => r,
        Err(e) => unreachable!("built-in directive pattern is valid: {}", e),
    }
}

#[derive(Debug, Clone)]
/// Environment shared by all drivers of one process run.
pub struct DriverContext {
    pub repo_root: PathBuf,
    pub cache_dir: PathBuf,
    pub rc_env: HashMap<String, String>,
    pub run: RunConfig,
}

impl DriverContext {
    pub fn from_effective(eff: &Effective, run: RunConfig) -> Self {
        Self {
            repo_root: eff.repo_root.clone(),
            cache_dir: eff.cache_dir.clone(),
            rc_env: eff.rc_env.clone(),
            run,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }
}

/// Run one driver over a file listing and return its summary.
pub fn run_driver(
    spec: &DriverSpec,
    paths: &[PathBuf],
    ctx: &DriverContext,
    runner: &dyn ToolRunner,
    sniffer: &dyn Sniffer,
) -> RunSummary {
    let mut run = RunSummary::new(&spec.name);
    let cache = spec
        .use_cache
        .then(|| ResultCache::new(ctx.cache_dir.join(&spec.name), &ctx.repo_root));
    let mut invoker = Invoker::new(runner, spec.program(), ctx.run.color)
        .with_policy(spec.missing_tool);

    // Sniffing reads file content, so the matcher sees resolved paths.
    let resolved: Vec<PathBuf> = paths
        .iter()
        .map(|p| ctx.resolve(p))
        .filter(|p| p.is_file())
        .collect();
    let candidates = spec.matcher.select(&resolved, sniffer);
    tracing::debug!(driver = %spec.name, count = candidates.len(), "selected candidates");

    for cand in candidates {
        let shown = display_path(&cand.path, &ctx.repo_root);
        let mut cand = Candidate::new(shown, cand.kind);
        let class = classify_one(spec, &mut cand, ctx, cache.as_ref(), &mut invoker);
        run.record(&cand, class);
    }

    run.tool_missing = invoker.tool_missing() && run.summary.failed > 0;
    run
}

fn classify_one(
    spec: &DriverSpec,
    cand: &mut Candidate,
    ctx: &DriverContext,
    cache: Option<&ResultCache>,
    invoker: &mut Invoker<'_>,
) -> Classification {
    let abs = ctx.resolve(&cand.path);
    let directive = if spec.lint_all {
        Directive::Present
    } else {
        match spec.directive.scan_file(&abs) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("{} {}", utils::error_prefix(ctx.run.color), e);
                return Classification::Failed;
            }
        }
    };
    if !directive.is_enabled() {
        tracing::debug!(file = %cand.path.display(), "no directive; skipped");
        return Classification::Skipped;
    }
    cand.options = directive.options().to_vec();

    if let Some(c) = cache {
        if c.is_valid(&cand.path) {
            tracing::debug!(file = %cand.path.display(), "cache hit");
            return Classification::Cached;
        }
    }

    let args = spec.command_args(&ctx.repo_root, &ctx.rc_env, &cand.options);
    let class = invoker.invoke(&cand.path, &args, &ctx.repo_root);
    if class == Classification::Passed {
        if let Some(c) = cache {
            if let Err(e) = c.record(&cand.path) {
                tracing::warn!(error = %e, "could not update result cache");
            }
        }
    }
    class
}

/// Repo-relative form of `abs` for display and cache keys.
fn display_path(abs: &Path, root: &Path) -> PathBuf {
    match abs.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => abs.to_path_buf(),
    }
}
