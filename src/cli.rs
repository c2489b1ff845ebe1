//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "optlint",
    version,
    about = "Opt-in lint harness for pylint, shellcheck and yamllint",
    long_about = "optlint runs linters only on files that opt in through a header directive \
(`# pylint:`, `# shellcheck`, `# yamllint`), caches passing pylint results, and \
folds everything into a single CI exit code.\n\nConfiguration precedence: CLI > env > optlint.toml > defaults.",
    after_help = "Examples:\n  optlint run\n  optlint run --staged\n  git ls-files '*.py' | optlint pylint\n  optlint shellcheck scripts/deploy.sh\n  optlint yamllint -a",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands: the multi-runner and one entry point per driver.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current optlint version.")]
    Version,
    /// Run every driver in sequence
    #[command(
        about = "Run all linters",
        long_about = "List repository files via git and run every driver not listed in `skip`. Exit code is the maximum over all drivers.",
        after_help = "Examples:\n  optlint run\n  optlint run --staged --output json"
    )]
    Run {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Only consider files staged for commit")]
        staged: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Python driver
    #[command(
        about = "Run pylint on opted-in Python files",
        long_about = "Reads one path per line from stdin unless paths are given. Files opt in with a `# pylint:` header line; `# pylint-args:` lines add tool arguments. Passing results are cached."
    )]
    Pylint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Files to consider (default: read from stdin)")]
        paths: Vec<String>,
    },
    /// Shell driver
    #[command(
        about = "Run shellcheck on opted-in shell scripts",
        long_about = "Reads one path per line from stdin unless paths are given. Files opt in with a `# shellcheck` header line."
    )]
    Shellcheck {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(help = "Files to consider (default: read from stdin)")]
        paths: Vec<String>,
    },
    /// YAML driver
    #[command(
        about = "Run yamllint on opted-in YAML files",
        long_about = "Lists tracked YAML files via git. Files opt in with a `# yamllint` header line unless -a is given."
    )]
    Yamllint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(short = 'a', long = "all", action = clap::ArgAction::SetTrue, help = "Lint all YAML files regardless of directive")]
        all: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Only consider files staged for commit")]
        staged: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
