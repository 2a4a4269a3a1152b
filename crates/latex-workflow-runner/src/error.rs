//! Error types for runner module

use thiserror::Error;

/// Failures to launch or supervise an external tool.
///
/// A tool that starts and then exits non-zero is *not* a `RunnerError`; that
/// outcome is reported through [`ProcessOutput`](crate::ProcessOutput).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("'{program}' was not found on PATH")]
    ProgramNotFound { program: String },

    #[error("Failed to spawn '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Failed to collect output of '{program}': {reason}")]
    OutputCaptureFailed { program: String, reason: String },
}
