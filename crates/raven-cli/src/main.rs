//! `raven`: run scripts, start a REPL, or run a directory of test scripts

mod repl;
mod test_runner;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use raven::{report, EvalContext, RunStatus, Session};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "raven", version, about = "The Raven scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Script to run (starts the REPL when omitted)
    file: Option<PathBuf>,

    #[command(flatten)]
    options: RunOptions,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a script
    Run {
        /// Script to run
        file: PathBuf,
    },

    /// Start the interactive REPL
    Repl,

    /// Run every script under the given files and directories
    Test {
        /// Scripts or directories holding `.rv` scripts
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct RunOptions {
    /// Maximum depth of nested function calls
    #[arg(long, global = true, default_value_t = 512)]
    max_call_depth: usize,

    /// Stop at the first failed `assert`
    #[arg(long, global = true)]
    fatal_tests: bool,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl RunOptions {
    fn context(&self) -> EvalContext {
        EvalContext {
            max_call_depth: self.max_call_depth,
            fatal_test_failures: self.fatal_tests,
            ..EvalContext::default()
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("raven={level},raven_cli={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);
    let ctx = cli.options.context();

    let code = match (cli.command, cli.file) {
        (Some(Command::Run { file }), _) | (None, Some(file)) => run_file(&file, ctx)?,
        (Some(Command::Repl), _) | (None, None) => {
            repl::run(ctx)?;
            0
        }
        (Some(Command::Test { paths }), _) => {
            if test_runner::run(&paths, ctx)? {
                0
            } else {
                1
            }
        }
    };

    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Read a script from disk.
pub(crate) fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Run one script in a fresh session, reporting faults on stderr.
fn run_file(path: &Path, ctx: EvalContext) -> Result<i32> {
    let source = read_script(path)?;
    let status = Session::new(ctx).run(&source);
    print_faults(&status, &source);
    Ok(status.exit_code())
}

/// Write the fault reports of a run to stderr.
pub(crate) fn print_faults(status: &RunStatus, source: &str) {
    let faults = status.faults();
    if !faults.is_empty() {
        eprintln!("{}", report::render_all(faults, source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_file_argument() {
        let cli = Cli::try_parse_from(["raven", "script.rv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("script.rv")));
    }

    #[test]
    fn test_flags_map_onto_context() {
        let cli = Cli::try_parse_from([
            "raven",
            "test",
            "scripts",
            "--fatal-tests",
            "--max-call-depth",
            "64",
            "-vv",
        ])
        .unwrap();
        let ctx = cli.options.context();
        assert_eq!(ctx.max_call_depth, 64);
        assert!(ctx.fatal_test_failures);
        assert!(!ctx.echo);
        assert_eq!(cli.options.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Test { paths }) if paths.len() == 1));
    }

    #[test]
    fn test_requires_a_path() {
        assert!(Cli::try_parse_from(["raven", "test"]).is_err());
    }
}
