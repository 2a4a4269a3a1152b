//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

/// latex-workflow - compile a LaTeX document to PDF
#[derive(Parser, Debug)]
#[command(name = "latex-workflow")]
#[command(about = "Compile a LaTeX document to PDF, running bibliography and code passes as needed")]
#[command(long_about = r#"
latex-workflow copies the document's directory into a temporary working area,
runs the compiler (lualatex by default), runs biber/bibtex and pythontex when
the document needs them, and reruns the compiler until cross-references settle.

On success the PDF is copied to the output directory. On failure the log and
every intermediate file the toolchain produced are copied there instead, and
the command exits with status 1.

EXAMPLES:
  # Compile into ./out
  latex-workflow paper.tex --output-directory out

  # Keep a build directory inside the project out of the working copy
  latex-workflow thesis/main.tex --output-directory thesis/out --ignore-directory out

  # Use bibtex and xelatex for this run
  latex-workflow paper.tex --output-directory out --compiler xelatex --bibliography-tool bibtex

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is discovered by searching upward from the document directory
  for .latex-workflow/config.toml
  Use --config or LATEX_WORKFLOW_CONFIG to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// LaTeX document to compile
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory receiving the PDF, or diagnostics on failure
    #[arg(long, value_name = "DIR")]
    pub output_directory: PathBuf,

    /// Directory name (or glob) to leave out of the working copy; repeatable
    #[arg(long = "ignore-directory", value_name = "NAME")]
    pub ignore_directories: Vec<String>,

    /// Path to configuration file (overrides discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Document compiler program
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// Bibliography processor program (biber or bibtex)
    #[arg(long, value_name = "PROGRAM")]
    pub bibliography_tool: Option<String>,

    /// Embedded code runner program
    #[arg(long, value_name = "PROGRAM")]
    pub code_tool: Option<String>,

    /// Maximum number of compiler runs, including the first
    #[arg(long, value_name = "N")]
    pub max_compiler_runs: Option<u32>,

    /// Print the compile result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
