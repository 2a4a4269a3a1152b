use camino::Utf8PathBuf;
use latex_workflow_runner::{DEFAULT_STDERR_CAP_BYTES, DEFAULT_STDOUT_CAP_BYTES, ToolKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Default upper bound on compiler runs per compile
pub const DEFAULT_MAX_COMPILER_RUNS: u32 = 5;

/// Default flags passed to the document compiler
pub const DEFAULT_COMPILER_ARGS: &[&str] = &[
    "-interaction=nonstopmode",
    "-halt-on-error",
    "-file-line-error",
    "-shell-escape",
];

/// Where a configuration value came from, highest precedence first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(Utf8PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::ConfigFile(path) => write!(f, "config ({path})"),
            Self::Defaults => write!(f, "default"),
        }
    }
}

/// Overrides taken from the command line.
///
/// Every field is optional; `None` leaves the file or default value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<Utf8PathBuf>,
    pub compiler: Option<String>,
    pub bibliography_tool: Option<String>,
    pub code_tool: Option<String>,
    pub max_compiler_runs: Option<u32>,
    pub verbose: Option<bool>,
}

/// A program and the arguments placed before the per-pass arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolConfig {
    #[must_use]
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Settings that are not tied to one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Total compiler runs allowed, including the first
    pub max_compiler_runs: u32,
    pub verbose: bool,
    pub stdout_cap_bytes: usize,
    pub stderr_cap_bytes: usize,
    /// Parent directory for temporary working areas (system temp when unset)
    pub work_root: Option<Utf8PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            max_compiler_runs: DEFAULT_MAX_COMPILER_RUNS,
            verbose: false,
            stdout_cap_bytes: DEFAULT_STDOUT_CAP_BYTES,
            stderr_cap_bytes: DEFAULT_STDERR_CAP_BYTES,
            work_root: None,
        }
    }
}

/// Which files reach the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactsConfig {
    /// Extensions (without dot) copied after a successful compile
    pub on_success: Vec<String>,
    /// Directory names skipped while staging and collecting
    pub ignore_directories: Vec<String>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            on_success: vec!["pdf".to_string()],
            ignore_directories: Vec::new(),
        }
    }
}

/// Resolved configuration for a compile.
///
/// Precedence: CLI arguments > config file > built-in defaults. Use
/// [`Config::discover_from`] for CLI semantics or [`Config::default`] for a
/// deterministic configuration independent of the user's files.
///
/// ```rust
/// use latex_workflow_config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.compiler.program, "lualatex");
/// assert_eq!(config.bibliography.program, "biber");
/// assert_eq!(config.code.program, "pythontex");
/// assert_eq!(config.defaults.max_compiler_runs, 5);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub compiler: ToolConfig,
    pub bibliography: ToolConfig,
    pub code: ToolConfig,
    pub artifacts: ArtifactsConfig,
    /// The config file that was loaded, if any
    pub config_file: Option<Utf8PathBuf>,
    /// Source of each setting, keyed by setting name
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let source_attribution = Self::TRACKED_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Defaults))
            .collect();

        Self {
            defaults: Defaults::default(),
            compiler: ToolConfig::new("lualatex", DEFAULT_COMPILER_ARGS),
            bibliography: ToolConfig::new("biber", &[]),
            code: ToolConfig::new("pythontex", &[]),
            artifacts: ArtifactsConfig::default(),
            config_file: None,
            source_attribution,
        }
    }
}

impl Config {
    pub(crate) const TRACKED_KEYS: &'static [&'static str] = &[
        "max_compiler_runs",
        "verbose",
        "stdout_cap_bytes",
        "stderr_cap_bytes",
        "work_root",
        "compiler",
        "bibliography",
        "code",
        "on_success",
        "ignore_directories",
    ];

    /// Tool configuration for a pass kind.
    #[must_use]
    pub fn tool(&self, kind: ToolKind) -> &ToolConfig {
        match kind {
            ToolKind::Compiler => &self.compiler,
            ToolKind::Bibliography => &self.bibliography,
            ToolKind::Code => &self.code,
        }
    }

    /// Where a setting came from.
    #[must_use]
    pub fn source_of(&self, key: &str) -> Option<&ConfigSource> {
        self.source_attribution.get(key)
    }
}

// ============================================================================
// On-disk representation
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub defaults: Option<TomlDefaults>,
    pub compiler: Option<TomlTool>,
    pub bibliography: Option<TomlTool>,
    pub code: Option<TomlTool>,
    pub artifacts: Option<TomlArtifacts>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlDefaults {
    pub max_compiler_runs: Option<u32>,
    pub verbose: Option<bool>,
    pub stdout_cap_bytes: Option<usize>,
    pub stderr_cap_bytes: Option<usize>,
    pub work_root: Option<Utf8PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlTool {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlArtifacts {
    pub on_success: Option<Vec<String>>,
    pub ignore_directories: Option<Vec<String>>,
}
