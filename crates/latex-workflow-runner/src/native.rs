use crate::error::RunnerError;
use crate::ring_buffer::RingBuffer;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::thread;

use super::{CommandSpec, ProcessOutput, ProcessRunner};

/// Default cap for captured stdout (2 MiB)
pub const DEFAULT_STDOUT_CAP_BYTES: usize = 2 * 1024 * 1024;

/// Default cap for captured stderr (256 KiB)
pub const DEFAULT_STDERR_CAP_BYTES: usize = 256 * 1024;

// ============================================================================
// NativeRunner - Native Process Execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// Bare program names are resolved on `PATH` before spawning so a missing TeX
/// installation is reported as [`RunnerError::ProgramNotFound`] instead of an
/// opaque spawn error. Both output streams are drained on helper threads into
/// [`RingBuffer`]s while the caller blocks on the child.
///
/// # Example
///
/// ```rust,no_run
/// use latex_workflow_runner::{CommandSpec, NativeRunner, ProcessRunner};
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("lualatex").arg("--version");
///
/// let output = runner.run(&cmd).unwrap();
/// assert!(output.success());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NativeRunner {
    stdout_cap_bytes: usize,
    stderr_cap_bytes: usize,
}

impl Default for NativeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stdout_cap_bytes: DEFAULT_STDOUT_CAP_BYTES,
            stderr_cap_bytes: DEFAULT_STDERR_CAP_BYTES,
        }
    }

    /// Use custom capture caps for stdout and stderr.
    #[must_use]
    pub const fn with_caps(stdout_cap_bytes: usize, stderr_cap_bytes: usize) -> Self {
        Self {
            stdout_cap_bytes,
            stderr_cap_bytes,
        }
    }

    /// Resolve the program to an executable path.
    ///
    /// Programs given with a directory component are made absolute against the
    /// current directory (the child runs elsewhere); bare names are looked up
    /// on `PATH`.
    pub fn resolve_program(program: &OsStr) -> Result<PathBuf, RunnerError> {
        let path = Path::new(program);
        if path.components().count() > 1 {
            return std::path::absolute(path).map_err(|e| RunnerError::SpawnFailed {
                program: program.to_string_lossy().into_owned(),
                reason: e.to_string(),
            });
        }

        which::which(program).map_err(|_| RunnerError::ProgramNotFound {
            program: program.to_string_lossy().into_owned(),
        })
    }

    fn drain<R>(mut pipe: R, cap: usize) -> thread::JoinHandle<std::io::Result<RingBuffer>>
    where
        R: Read + Send + 'static,
    {
        thread::spawn(move || {
            let mut buffer = RingBuffer::new(cap);
            let mut chunk = [0u8; 8192];
            loop {
                match pipe.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => buffer.write(&chunk[..n]),
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(buffer)
        })
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput, RunnerError> {
        let program_name = cmd.program.to_string_lossy().into_owned();
        let resolved = Self::resolve_program(&cmd.program)?;

        let mut command = cmd.with_program(&resolved).to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(program = %resolved.display(), "Spawning process");

        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program_name.clone(),
            reason: e.to_string(),
        })?;

        let capture_failed = |reason: String| RunnerError::OutputCaptureFailed {
            program: program_name.clone(),
            reason,
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| capture_failed("stdout pipe unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| capture_failed("stderr pipe unavailable".to_string()))?;

        let stdout_handle = Self::drain(stdout, self.stdout_cap_bytes);
        let stderr_handle = Self::drain(stderr, self.stderr_cap_bytes);

        let status = child
            .wait()
            .map_err(|e| capture_failed(format!("wait failed: {e}")))?;

        let stdout_buffer = stdout_handle
            .join()
            .map_err(|_| capture_failed("stdout reader panicked".to_string()))?
            .map_err(|e| capture_failed(e.to_string()))?;
        let stderr_buffer = stderr_handle
            .join()
            .map_err(|_| capture_failed("stderr reader panicked".to_string()))?
            .map_err(|e| capture_failed(e.to_string()))?;

        let truncated = stdout_buffer.was_truncated() || stderr_buffer.was_truncated();
        let mut output = ProcessOutput::new(
            stdout_buffer.into_bytes(),
            stderr_buffer.into_bytes(),
            status.code(),
        );
        output.truncated = truncated;
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_reported_by_name() {
        let runner = NativeRunner::new();
        let cmd = CommandSpec::new("definitely-not-a-tex-engine-3f9a");

        match runner.run(&cmd) {
            Err(RunnerError::ProgramNotFound { program }) => {
                assert_eq!(program, "definitely-not-a-tex-engine-3f9a");
            }
            other => panic!("expected ProgramNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_captures_stdout_and_exit_code() {
        let runner = NativeRunner::new();
        let output = runner
            .run(&CommandSpec::new("echo").arg("Output written on doc.pdf"))
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout_string().trim(), "Output written on doc.pdf");
        assert!(!output.truncated);
    }

    #[test]
    fn test_non_zero_exit_is_output_not_error() {
        let runner = NativeRunner::new();
        let output = runner.run(&CommandSpec::new("false")).unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(1));
    }

    #[test]
    fn test_runs_in_requested_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.tex"), "x").unwrap();

        let runner = NativeRunner::new();
        let output = runner
            .run(&CommandSpec::new("ls").cwd(dir.path()))
            .unwrap();
        assert!(output.stdout_string().contains("marker.tex"));
    }

    #[test]
    fn test_output_is_capped_to_tail() {
        let runner = NativeRunner::with_caps(4, 4);
        let output = runner
            .run(&CommandSpec::new("echo").arg("abcdefgh"))
            .unwrap();

        assert!(output.truncated);
        assert_eq!(output.stdout_string(), "fgh\n");
    }

    #[test]
    fn test_explicit_path_skips_lookup() {
        let resolved = NativeRunner::resolve_program(OsStr::new("/usr/bin/env")).unwrap();
        assert_eq!(resolved, PathBuf::from("/usr/bin/env"));
    }
}
