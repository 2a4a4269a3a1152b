//! Configuration for latex-workflow
//!
//! Resolves which programs make up the toolchain, how many compiler runs are
//! allowed, and which files are collected, from CLI flags, an optional
//! `.latex-workflow/config.toml`, and built-in defaults.

mod discovery;
mod model;
mod validation;

pub use discovery::{CONFIG_DIR, CONFIG_ENV, CONFIG_FILE};
pub use model::{
    ArtifactsConfig, CliArgs, Config, ConfigSource, DEFAULT_COMPILER_ARGS,
    DEFAULT_MAX_COMPILER_RUNS, Defaults, ToolConfig,
};
pub use validation::MAX_COMPILER_RUNS_LIMIT;
