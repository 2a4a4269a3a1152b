//! Exit code constants for latex-workflow.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | PDF produced and copied |
//! | 1 | `FAILURE` | Any failure: arguments, configuration, toolchain, file system |

/// Process exit code.
///
/// Use [`as_i32()`](Self::as_i32) to get the numeric value for
/// `std::process::exit()`.
///
/// ```rust
/// use latex_workflow_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::FAILURE, ExitCode::from_i32(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the document compiled and the PDF was copied
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Failure - anything else
    pub const FAILURE: ExitCode = ExitCode(1);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
