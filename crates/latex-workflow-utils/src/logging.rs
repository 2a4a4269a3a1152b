//! Logging infrastructure for latex-workflow
//!
//! Structured logging through `tracing`. Everything is written to stderr so
//! that `--json` output on stdout stays machine-readable.

use std::io::IsTerminal;
use tracing::{Level, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if stderr is a terminal and `NO_COLOR` is not set.
fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Without it, verbose mode enables debug output
/// for this crate family and reports span durations when a compile finishes.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("latex_workflow=debug,latex_workflow_runner=debug,info")
            } else {
                EnvFilter::try_new("latex_workflow=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(use_color())
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .without_time()
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one compile request.
pub fn compile_span(job: &str, output_dir: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "compile",
        job = %job,
        output_dir = %output_dir,
    )
}

pub fn log_pass_start(tool: &str, program: &str, run: u32) {
    info!(
        tool = %tool,
        program = %program,
        run = run,
        "Starting pass"
    );
}

pub fn log_pass_complete(tool: &str, exit_code: Option<i32>, duration_ms: u128) {
    match exit_code {
        Some(0) => tracing::debug!(
            tool = %tool,
            duration_ms = %duration_ms,
            "Pass completed"
        ),
        _ => tracing::error!(
            tool = %tool,
            exit_code = ?exit_code,
            duration_ms = %duration_ms,
            "Pass failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }

    #[test]
    fn test_span_and_pass_logging_without_subscriber() {
        let span = compile_span("paper", "/out");
        let _guard = span.enter();
        log_pass_start("compiler", "lualatex", 1);
        log_pass_complete("compiler", Some(0), 12);
        log_pass_complete("compiler", Some(1), 12);
    }
}
