//! optlint CLI binary entry point.
//! Resolves configuration, gathers the file listing, and delegates to the
//! driver pipeline or the multi-runner.

use clap::Parser;
use optlint::classify::ShebangSniffer;
use optlint::cli::{Cli, Commands};
use optlint::config::{self, Effective, RunConfig};
use optlint::driver::{self, DriverContext, DriverSpec};
use optlint::error::{Error, Result};
use optlint::invoke::ProcessRunner;
use optlint::sources::{self, Listing};
use optlint::{output, runner, utils};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::Run {
            repo_root,
            staged,
            output,
        } => with_effective(repo_root.as_deref(), output.as_deref(), |eff, rc| {
            let listing = sources::git_files(&eff.repo_root, Listing::from_staged_flag(staged))?;
            let paths = runner::filter_excluded(eff, listing);
            let outcome = runner::run_all(eff, rc, &paths, &ProcessRunner, &ShebangSniffer);
            if rc.output == config::OutputMode::Human {
                println!(
                    "{}",
                    output::render_overall(&outcome.codes, outcome.exit_code, &rc)
                );
            }
            Ok(outcome.exit_code)
        }),
        Commands::Pylint {
            repo_root,
            output,
            paths,
        } => with_effective(repo_root.as_deref(), output.as_deref(), |eff, rc| {
            let paths = explicit_or_stdin(paths)?;
            run_single(eff, rc, DriverSpec::pylint(), paths)
        }),
        Commands::Shellcheck {
            repo_root,
            output,
            paths,
        } => with_effective(repo_root.as_deref(), output.as_deref(), |eff, rc| {
            let paths = explicit_or_stdin(paths)?;
            run_single(eff, rc, DriverSpec::shellcheck(), paths)
        }),
        Commands::Yamllint {
            repo_root,
            all,
            staged,
            output,
        } => with_effective(repo_root.as_deref(), output.as_deref(), |eff, rc| {
            let paths = sources::git_files(&eff.repo_root, Listing::from_staged_flag(staged))?;
            let mut spec = DriverSpec::yamllint();
            spec.lint_all = all;
            run_single(eff, rc, spec, paths)
        }),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("OPTLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Resolve configuration, run `f`, and map errors to exit codes.
fn with_effective<F>(repo_root: Option<&str>, output: Option<&str>, f: F) -> ExitCode
where
    F: FnOnce(&Effective, RunConfig) -> Result<u8>,
{
    let eff = match config::resolve_effective(repo_root, output, &config::process_env) {
        Ok(eff) => eff,
        Err(e) => return report(&e, io::stderr().is_terminal()),
    };
    let rc = RunConfig::detect(eff.output, &config::process_env);
    if !eff.config_found && rc.output == config::OutputMode::Human {
        eprintln!(
            "{} No optlint.toml found; using defaults.",
            utils::note_prefix(rc.color)
        );
    }
    match f(&eff, rc) {
        Ok(code) => ExitCode::from(code),
        Err(e) => report(&e, rc.color),
    }
}

fn report(e: &Error, color: bool) -> ExitCode {
    eprintln!("{} {}", utils::error_prefix(color), e);
    ExitCode::from(e.exit_code())
}

/// Paths from arguments or stdin, anchored at the current directory.
fn explicit_or_stdin(paths: Vec<String>) -> Result<Vec<PathBuf>> {
    let raw = if !paths.is_empty() {
        paths.into_iter().map(PathBuf::from).collect()
    } else if io::stdin().is_terminal() {
        return Err(Error::Usage(
            "no paths given; pass files as arguments or pipe them on stdin".into(),
        ));
    } else {
        sources::read_paths(io::stdin().lock())?
    };
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    Ok(raw.into_iter().map(|p| cwd.join(p)).collect())
}

/// One driver entry point: empty runs are a configuration error.
fn run_single(
    eff: &Effective,
    rc: RunConfig,
    spec: DriverSpec,
    paths: Vec<PathBuf>,
) -> Result<u8> {
    let settings = eff.driver_settings(&spec.name);
    let spec = spec.with_settings(&settings)?;
    let paths = runner::filter_excluded(eff, paths);
    let ctx = DriverContext::from_effective(eff, rc);
    let run = driver::run_driver(&spec, &paths, &ctx, &ProcessRunner, &ShebangSniffer);
    if run.is_empty() {
        return Err(Error::NoCandidates);
    }
    let code = run.exit_code(true);
    output::print_run(&run, &rc, code);
    Ok(code)
}
