use camino::Utf8PathBuf;
use latex_workflow_runner::ToolKind;
use std::fmt;
use thiserror::Error;

pub use latex_workflow_runner::RunnerError;

/// Library-level error type with user-facing rendering.
///
/// `LatexWorkflowError` is what the orchestrator and the CLI deal in.
/// The variant that matters most is [`Toolchain`](Self::Toolchain): an
/// external tool ran and exited non-zero, and the error carries its captured
/// output. The remaining variants cover problems that stop a compile before or
/// around the toolchain (bad arguments, unreadable config, a missing binary,
/// file-system failures while staging or collecting artifacts).
///
/// # Exit Code Mapping
///
/// Every variant maps to exit code 1 via [`to_exit_code()`](Self::to_exit_code).
///
/// # Example
///
/// ```rust
/// use latex_workflow_utils::error::LatexWorkflowError;
/// use latex_workflow_utils::exit_codes::ExitCode;
///
/// let err = LatexWorkflowError::InvalidRequest {
///     reason: "input file does not exist: paper.tex".to_string(),
/// };
/// assert_eq!(err.to_exit_code(), ExitCode::FAILURE);
/// assert!(err.display_for_user().contains("Suggestions:"));
/// ```
#[derive(Error, Debug)]
pub enum LatexWorkflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Toolchain(#[from] ToolchainError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Invalid compile request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Failed to stage document: {reason}")]
    Staging { reason: String },

    #[error("Failed to collect artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An external tool exited unsuccessfully.
///
/// `output` is the tail of the tool's combined stdout/stderr, bounded by the
/// runner's capture caps. `artifacts_dir` is where diagnostic files were
/// copied, when copying succeeded.
#[derive(Debug, Clone)]
pub struct ToolchainError {
    pub tool: ToolKind,
    pub program: String,
    pub exit_code: Option<i32>,
    pub output: String,
    pub artifacts_dir: Option<Utf8PathBuf>,
}

impl ToolchainError {
    /// Last `max_lines` lines of the captured output.
    #[must_use]
    pub fn output_tail(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self.output.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

impl fmt::Display for ToolchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(0) => write!(
                f,
                "{} '{}' finished without producing a PDF",
                self.tool, self.program
            ),
            Some(code) => write!(
                f,
                "{} '{}' failed with exit code {code}",
                self.tool, self.program
            ),
            None => write!(
                f,
                "{} '{}' was terminated by a signal",
                self.tool, self.program
            ),
        }
    }
}

impl std::error::Error for ToolchainError {}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} could not be read: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "Configuration files are TOML with optional [defaults], [compiler], [bibliography], [code] and [artifacts] tables."
                    .to_string(),
            ),
            Self::InvalidValue { .. } => None,
            Self::NotFound { .. } => Some(
                "latex-workflow searches for .latex-workflow/config.toml from the document directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the file for TOML syntax errors".to_string(),
                "Remove unknown keys; misspelled keys are rejected".to_string(),
            ],
            Self::InvalidValue { key, .. } => {
                vec![format!("Fix the value of '{key}' in the config file or on the command line")]
            }
            Self::NotFound { .. } => vec![
                "Check the path passed to --config or LATEX_WORKFLOW_CONFIG".to_string(),
            ],
        }
    }
}

impl UserFriendlyError for LatexWorkflowError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Toolchain(err) => err.to_string(),
            Self::Runner(RunnerError::ProgramNotFound { program }) => {
                format!("The program '{program}' is not installed or not on PATH")
            }
            Self::Runner(err) => err.to_string(),
            Self::InvalidRequest { reason } => reason.clone(),
            Self::Staging { reason } => format!("Could not prepare the build directory: {reason}"),
            Self::Artifact { path, reason } => {
                format!("Could not copy {path} to the output directory: {reason}")
            }
            Self::Io(err) => format!("File system error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Toolchain(err) => match err.tool {
                ToolKind::Compiler => {
                    Some("The document compiler stopped on an error in the document.".to_string())
                }
                ToolKind::Bibliography => Some(
                    "The bibliography processor could not process the citation data.".to_string(),
                ),
                ToolKind::Code => {
                    Some("An embedded code block failed while it was being executed.".to_string())
                }
            },
            Self::Runner(_) => {
                Some("latex-workflow drives an existing TeX installation.".to_string())
            }
            Self::InvalidRequest { .. } | Self::Staging { .. } | Self::Artifact { .. } | Self::Io(_) => {
                None
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Toolchain(err) => {
                let mut suggestions = vec![format!(
                    "Read the {} output above for the first error",
                    err.tool
                )];
                if let Some(dir) = &err.artifacts_dir {
                    suggestions.push(format!("Intermediate files were copied to {dir}"));
                }
                suggestions
            }
            Self::Runner(_) => vec![
                "Install a TeX distribution that provides the tool (TeX Live, MiKTeX)".to_string(),
                "Or point [compiler]/[bibliography]/[code] program at the right binary".to_string(),
            ],
            Self::InvalidRequest { .. } => {
                vec!["Pass the path of an existing .tex file".to_string()]
            }
            Self::Staging { .. } | Self::Artifact { .. } | Self::Io(_) => vec![
                "Check permissions and free space for the output and temporary directories"
                    .to_string(),
            ],
        }
    }
}

impl LatexWorkflowError {
    /// Captured toolchain failure, if this is one.
    #[must_use]
    pub fn as_toolchain(&self) -> Option<&ToolchainError> {
        match self {
            Self::Toolchain(err) => Some(err),
            _ => None,
        }
    }

    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        crate::exit_codes::ExitCode::FAILURE
    }
}
