use latex_workflow_runner::ToolKind;
use latex_workflow_utils::error::ConfigError;

use crate::model::Config;

/// Hard ceiling on compiler runs; TeX documents that need more never converge
pub const MAX_COMPILER_RUNS_LIMIT: u32 = 10;

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let runs = self.defaults.max_compiler_runs;
        if runs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_compiler_runs".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }
        if runs > MAX_COMPILER_RUNS_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "max_compiler_runs".to_string(),
                value: format!("{runs} exceeds maximum limit of {MAX_COMPILER_RUNS_LIMIT}"),
            });
        }

        if self.defaults.stdout_cap_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "stdout_cap_bytes".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }
        if self.defaults.stderr_cap_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "stderr_cap_bytes".to_string(),
                value: "must be greater than 0".to_string(),
            });
        }

        for kind in [ToolKind::Compiler, ToolKind::Bibliography, ToolKind::Code] {
            if self.tool(kind).program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("{kind}.program"),
                    value: "must not be empty".to_string(),
                });
            }
        }

        for ext in &self.artifacts.on_success {
            if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    key: "artifacts.on_success".to_string(),
                    value: format!("'{ext}' is not a bare file extension"),
                });
            }
        }

        Ok(())
    }
}
