//! CLI entry point
//!
//! `run()` owns all user-facing output. Logs go to stderr; `--json` output is
//! the only thing written to stdout.

use camino::Utf8PathBuf;
use clap::Parser;
use std::ffi::OsString;

use super::args::Cli;
use crate::{
    CliArgs, CompileRequest, CompileResult, Config, ExitCode, LatexWorkflowError, NativeRunner,
    Orchestrator,
};
use latex_workflow_utils::logging::init_tracing;
use latex_workflow_utils::paths::{absolutize, to_utf8};

/// Lines of tool output shown when a pass fails
const FAILURE_TAIL_LINES: usize = 40;

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after printing the reason; main.rs only maps it to
/// the process exit status.
pub fn run() -> Result<(), ExitCode> {
    run_from(std::env::args_os())
}

/// Like [`run`], with explicit arguments.
pub fn run_from<I, T>(args: I) -> Result<(), ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version arrive here as "errors" that print to stdout
            return if err.use_stderr() {
                Err(ExitCode::FAILURE)
            } else {
                Ok(())
            };
        }
    };

    match execute(&cli) {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{}", err.display_for_user());
            Err(err.to_exit_code())
        }
    }
}

fn execute(cli: &Cli) -> Result<(), LatexWorkflowError> {
    let file = to_utf8(&cli.file)?;
    let output_directory = to_utf8(&cli.output_directory)?;

    let cli_args = CliArgs {
        config_path: cli.config.as_deref().map(to_utf8).transpose()?,
        compiler: cli.compiler.clone(),
        bibliography_tool: cli.bibliography_tool.clone(),
        code_tool: cli.code_tool.clone(),
        max_compiler_runs: cli.max_compiler_runs,
        verbose: cli.verbose.then_some(true),
    };

    let input = absolutize(&file)?;
    let start_dir = input
        .parent()
        .map_or_else(|| Utf8PathBuf::from("."), Utf8PathBuf::from);
    let config = Config::discover_from(&start_dir, &cli_args)?;

    if let Err(e) = init_tracing(config.defaults.verbose) {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }
    if let Some(path) = &config.config_file {
        tracing::debug!(config = %path, "Loaded configuration file");
    }

    let runner = NativeRunner::with_caps(
        config.defaults.stdout_cap_bytes,
        config.defaults.stderr_cap_bytes,
    );
    let request = CompileRequest::new(file, output_directory)
        .ignore_directories(cli.ignore_directories.iter().cloned());

    let result = Orchestrator::new(config, runner).run(&request)?;

    if cli.json {
        print_json(&result)?;
    }

    match result.toolchain_error() {
        None => {
            if !cli.json
                && let Some(pdf) = &result.pdf_path
            {
                eprintln!("✓ Wrote {pdf}");
            }
            Ok(())
        }
        Some(err) => {
            // Captured output tail first, summary last
            eprintln!("{}", err.output_tail(FAILURE_TAIL_LINES));
            Err(err.into())
        }
    }
}

fn print_json(result: &CompileResult) -> Result<(), LatexWorkflowError> {
    let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}
