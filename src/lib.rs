//! latex-workflow - compile LaTeX documents to PDF
//!
//! Runs the LaTeX toolchain (compiler, bibliography processor and embedded
//! code runner) against a staged copy of a document's directory, reruns the
//! compiler until cross-references settle, and copies the PDF, or on failure
//! the generated diagnostics, into an output directory.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! latex-workflow thesis/main.tex --output-directory thesis/out
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use latex_workflow::{CompileRequest, compile_latex};
//!
//! let request = CompileRequest::new("thesis/main.tex", "thesis/out")
//!     .ignore_directories(["out"]);
//! let result = compile_latex(&request)?;
//! println!("wrote {}", result.pdf_path.unwrap());
//! # Ok::<(), latex_workflow::LatexWorkflowError>(())
//! ```
//!
//! For full control over configuration or process execution, build an
//! [`Orchestrator`] with a [`Config`] and any [`ProcessRunner`].

pub mod cli;
pub mod orchestrator;
pub mod types;

pub use latex_workflow_config::{CliArgs, Config, ConfigSource};
pub use latex_workflow_runner::{CommandSpec, NativeRunner, ProcessOutput, ProcessRunner, ToolKind};
pub use latex_workflow_utils::error::{
    ConfigError, LatexWorkflowError, ToolchainError, UserFriendlyError,
};
pub use latex_workflow_utils::exit_codes::ExitCode;
pub use orchestrator::Orchestrator;
pub use types::{CompileRequest, CompileResult, PassFailure, PassRecord};

use latex_workflow_utils::paths::absolutize;

/// Compile a document with the discovered configuration and the native runner.
///
/// Configuration is searched upward from the document's directory. A toolchain
/// failure is returned as [`LatexWorkflowError::Toolchain`] after diagnostics
/// have been copied to the output directory.
pub fn compile_latex(request: &CompileRequest) -> Result<CompileResult, LatexWorkflowError> {
    let input = absolutize(request.input())?;
    let start_dir = input.parent().unwrap_or(&input);
    let config = Config::discover_from(start_dir, &CliArgs::default())?;
    let runner = NativeRunner::with_caps(
        config.defaults.stdout_cap_bytes,
        config.defaults.stderr_cap_bytes,
    );
    Orchestrator::new(config, runner).compile(request)
}
