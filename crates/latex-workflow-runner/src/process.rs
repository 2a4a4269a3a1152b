use crate::error::RunnerError;

use super::CommandSpec;

/// What a finished tool left behind on its standard streams.
///
/// Both streams hold the most recent bytes only once their cap is reached.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the child was killed by a signal
    pub exit_code: Option<i32>,
    /// Set when either stream lost bytes to its cap
    pub truncated: bool,
}

impl ProcessOutput {
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            truncated: false,
        }
    }

    /// Stdout decoded lossily; TeX logs are not guaranteed to be UTF-8.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Stdout followed by stderr, as a tool's log would read on a terminal.
    #[must_use]
    pub fn combined_string(&self) -> String {
        let mut combined = self.stdout_string();
        if !self.stderr.is_empty() {
            if !combined.is_empty() && !combined.ends_with('\n') {
                combined.push('\n');
            }
            combined.push_str(&self.stderr_string());
        }
        combined
    }

    /// Exit code 0. Signal termination counts as failure.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external tools on behalf of the orchestrator.
///
/// Implementations pass arguments argv-style and never through a shell.
/// Execution is synchronous: `run` returns once the child has exited. There is
/// no timeout; a hung compiler hangs the compile, exactly as it would when run
/// by hand.
///
/// The `Send + Sync` bound lets one runner serve compiles on several threads.
///
/// # Example
///
/// ```rust
/// use latex_workflow_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};
///
/// struct AlwaysSucceeds;
///
/// impl ProcessRunner for AlwaysSucceeds {
///     fn run(&self, _cmd: &CommandSpec) -> Result<ProcessOutput, RunnerError> {
///         Ok(ProcessOutput::new(b"Output written on doc.pdf".to_vec(), Vec::new(), Some(0)))
///     }
/// }
///
/// let output = AlwaysSucceeds.run(&CommandSpec::new("lualatex")).unwrap();
/// assert!(output.success());
/// ```
pub trait ProcessRunner: Send + Sync {
    /// Run `cmd` to completion.
    ///
    /// A non-zero exit is still `Ok`; `Err` means the tool could not be
    /// started or its output could not be read.
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput, RunnerError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd)
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for Box<R> {
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd)
    }
}
