//! Request and result types for a single compile.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use latex_workflow_runner::ToolKind;
use latex_workflow_utils::error::ToolchainError;
use serde::Serialize;

/// What to compile and where to put the results.
///
/// ```rust
/// use latex_workflow::CompileRequest;
///
/// let request = CompileRequest::new("thesis/main.tex", "thesis/out")
///     .ignore_directories(["out", "drafts"]);
/// assert_eq!(request.ignored_directories(), ["out", "drafts"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    input: Utf8PathBuf,
    output_directory: Utf8PathBuf,
    ignore_directories: Vec<String>,
}

impl CompileRequest {
    pub fn new(input: impl Into<Utf8PathBuf>, output_directory: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_directory: output_directory.into(),
            ignore_directories: Vec::new(),
        }
    }

    /// Directory names (or glob patterns) skipped while staging and collecting.
    #[must_use]
    pub fn ignore_directories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_directories
            .extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn input(&self) -> &Utf8Path {
        &self.input
    }

    #[must_use]
    pub fn output_directory(&self) -> &Utf8Path {
        &self.output_directory
    }

    #[must_use]
    pub fn ignored_directories(&self) -> &[String] {
        &self.ignore_directories
    }
}

/// One invocation of one external tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassRecord {
    pub tool: ToolKind,
    pub program: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// The pass that stopped a compile.
///
/// `exit_code` is `Some(0)` when the compiler succeeded but wrote no PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassFailure {
    pub tool: ToolKind,
    pub program: String,
    pub exit_code: Option<i32>,
}

/// Outcome of a compile.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    pub success: bool,
    /// Document file stem
    pub job: String,
    pub output_directory: Utf8PathBuf,
    /// Path of the PDF in the output directory, on success
    pub pdf_path: Option<Utf8PathBuf>,
    /// Captured output of the failing pass, on failure
    pub diagnostics: Option<String>,
    pub failure: Option<PassFailure>,
    pub passes: Vec<PassRecord>,
    pub compiler_runs: u32,
    /// Files written to the output directory
    pub artifacts: Vec<Utf8PathBuf>,
    pub completed_at: DateTime<Utc>,
}

impl CompileResult {
    /// The failure as an error value, or `None` for a successful compile.
    #[must_use]
    pub fn toolchain_error(&self) -> Option<ToolchainError> {
        let failure = self.failure.as_ref()?;
        Some(ToolchainError {
            tool: failure.tool,
            program: failure.program.clone(),
            exit_code: failure.exit_code,
            output: self.diagnostics.clone().unwrap_or_default(),
            artifacts_dir: Some(self.output_directory.clone()),
        })
    }

    /// Tools in the order they ran.
    #[must_use]
    pub fn pass_tools(&self) -> Vec<ToolKind> {
        self.passes.iter().map(|pass| pass.tool).collect()
    }
}
