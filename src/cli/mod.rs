//! Command-line interface for latex-workflow
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, configuration and output

pub mod args;
mod run;

pub use args::Cli;
pub use run::{run, run_from};
