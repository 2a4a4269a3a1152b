use camino::{Utf8Path, Utf8PathBuf};
use latex_workflow_utils::error::ConfigError;
use std::fs;

use crate::model::{CliArgs, Config, ConfigSource, TomlConfig, TomlTool, ToolConfig};

/// Directory holding the project config file
pub const CONFIG_DIR: &str = ".latex-workflow";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "LATEX_WORKFLOW_CONFIG";

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// The config file is, in order: `cli_args.config_path`, the file named by
    /// `LATEX_WORKFLOW_CONFIG`, or the first `.latex-workflow/config.toml`
    /// found walking upward from `start_dir` (normally the document's
    /// directory). An explicitly named file that does not exist is an error;
    /// finding nothing during the upward search is not.
    pub fn discover_from(start_dir: &Utf8Path, cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        let explicit = cli_args.config_path.clone().or_else(|| {
            std::env::var(CONFIG_ENV)
                .ok()
                .filter(|value| !value.is_empty())
                .map(Utf8PathBuf::from)
        });

        let config_path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound {
                        path: path.to_string(),
                    });
                }
                Some(path)
            }
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config, path);
            config.config_file = Some(path.clone());
        }

        config.apply_cli(cli_args);
        config.validate()?;

        for (key, source) in &config.source_attribution {
            tracing::debug!(key = %key, source = %source, "Configuration value");
        }

        Ok(config)
    }

    /// Walk upward from `start_dir` looking for `.latex-workflow/config.toml`.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Utf8Path) -> Option<Utf8PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    pub(crate) fn load_config_file(path: &Utf8Path) -> Result<TomlConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::InvalidFile {
            path: path.to_string(),
            reason: e.message().to_string(),
        })
    }

    fn apply_file(&mut self, file: TomlConfig, path: &Utf8Path) {
        let source = ConfigSource::ConfigFile(path.to_path_buf());

        if let Some(defaults) = file.defaults {
            if let Some(value) = defaults.max_compiler_runs {
                self.defaults.max_compiler_runs = value;
                self.attribute("max_compiler_runs", &source);
            }
            if let Some(value) = defaults.verbose {
                self.defaults.verbose = value;
                self.attribute("verbose", &source);
            }
            if let Some(value) = defaults.stdout_cap_bytes {
                self.defaults.stdout_cap_bytes = value;
                self.attribute("stdout_cap_bytes", &source);
            }
            if let Some(value) = defaults.stderr_cap_bytes {
                self.defaults.stderr_cap_bytes = value;
                self.attribute("stderr_cap_bytes", &source);
            }
            if let Some(value) = defaults.work_root {
                let base = work_root_base(path);
                self.defaults.work_root = Some(if value.is_absolute() {
                    value
                } else {
                    base.join(value)
                });
                self.attribute("work_root", &source);
            }
        }

        if let Some(tool) = file.compiler {
            if merge_tool(&mut self.compiler, tool) {
                self.attribute("compiler", &source);
            }
        }
        if let Some(tool) = file.bibliography {
            if merge_tool(&mut self.bibliography, tool) {
                self.attribute("bibliography", &source);
            }
        }
        if let Some(tool) = file.code {
            if merge_tool(&mut self.code, tool) {
                self.attribute("code", &source);
            }
        }

        if let Some(artifacts) = file.artifacts {
            if let Some(value) = artifacts.on_success {
                self.artifacts.on_success = value;
                self.attribute("on_success", &source);
            }
            if let Some(value) = artifacts.ignore_directories {
                self.artifacts.ignore_directories = value;
                self.attribute("ignore_directories", &source);
            }
        }
    }

    fn apply_cli(&mut self, cli_args: &CliArgs) {
        if let Some(program) = &cli_args.compiler {
            self.compiler.program = program.clone();
            self.attribute("compiler", &ConfigSource::Cli);
        }
        if let Some(program) = &cli_args.bibliography_tool {
            self.bibliography.program = program.clone();
            self.attribute("bibliography", &ConfigSource::Cli);
        }
        if let Some(program) = &cli_args.code_tool {
            self.code.program = program.clone();
            self.attribute("code", &ConfigSource::Cli);
        }
        if let Some(runs) = cli_args.max_compiler_runs {
            self.defaults.max_compiler_runs = runs;
            self.attribute("max_compiler_runs", &ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            self.defaults.verbose = verbose;
            self.attribute("verbose", &ConfigSource::Cli);
        }
    }

    fn attribute(&mut self, key: &str, source: &ConfigSource) {
        self.source_attribution
            .insert(key.to_string(), source.clone());
    }
}

/// Directory a relative `work_root` is resolved against: the project root
/// for `.latex-workflow/config.toml`, the file's own directory otherwise.
fn work_root_base(config_path: &Utf8Path) -> &Utf8Path {
    let parent = config_path.parent().unwrap_or_else(|| Utf8Path::new(""));
    if parent.file_name() == Some(CONFIG_DIR) {
        parent.parent().unwrap_or(parent)
    } else {
        parent
    }
}

fn merge_tool(target: &mut ToolConfig, file: TomlTool) -> bool {
    let mut changed = false;
    if let Some(program) = file.program {
        target.program = program;
        changed = true;
    }
    if let Some(args) = file.args {
        target.args = args;
        changed = true;
    }
    changed
}
