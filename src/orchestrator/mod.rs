//! Compile orchestration
//!
//! [`Orchestrator`] stages a document directory into a temporary working area,
//! drives the compiler, bibliography and code passes through a
//! [`ProcessRunner`], and copies the outcome into the output directory.
//!
//! Toolchain failures are results, not errors: [`Orchestrator::run`] returns
//! `Ok` with `success == false` once diagnostics have been collected.
//! [`Orchestrator::compile`] turns that into
//! [`LatexWorkflowError::Toolchain`] for callers that only want the PDF.

mod artifacts;
mod passes;
mod staging;

use camino::Utf8Path;
use chrono::Utc;
use latex_workflow_config::Config;
use latex_workflow_runner::{ProcessOutput, ProcessRunner, ToolKind};
use latex_workflow_utils::error::LatexWorkflowError;
use latex_workflow_utils::logging::{compile_span, log_pass_complete, log_pass_start};
use latex_workflow_utils::paths::{DirectoryFilter, absolutize};
use std::fs;
use std::time::Instant;

pub use passes::{BibliographyMarker, rerun_requested};

use crate::types::{CompileRequest, CompileResult, PassFailure, PassRecord};
use staging::StagedDocument;

/// Runs the LaTeX toolchain for compile requests.
///
/// Holds only immutable configuration, so one orchestrator can serve
/// concurrent requests when its runner is `Sync`.
#[derive(Debug, Clone)]
pub struct Orchestrator<R> {
    config: Config,
    runner: R,
}

/// Passes run so far and, if one failed, how.
struct Execution {
    passes: Vec<PassRecord>,
    compiler_runs: u32,
    failure: Option<(PassFailure, String)>,
}

impl Execution {
    fn new() -> Self {
        Self {
            passes: Vec::new(),
            compiler_runs: 0,
            failure: None,
        }
    }
}

impl<R: ProcessRunner> Orchestrator<R> {
    pub fn new(config: Config, runner: R) -> Self {
        Self { config, runner }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile and return the outcome, successful or not.
    pub fn run(&self, request: &CompileRequest) -> Result<CompileResult, LatexWorkflowError> {
        let input = absolutize(request.input())?;
        if !input.is_file() {
            return Err(LatexWorkflowError::InvalidRequest {
                reason: format!("input file does not exist: {}", request.input()),
            });
        }
        let (Some(source_dir), Some(job), Some(document)) =
            (input.parent(), input.file_stem(), input.file_name())
        else {
            return Err(LatexWorkflowError::InvalidRequest {
                reason: format!("not a document path: {input}"),
            });
        };
        let output_dir = absolutize(request.output_directory())?;

        let span = compile_span(job, output_dir.as_str());
        let _guard = span.enter();

        fs::create_dir_all(&output_dir).map_err(|e| LatexWorkflowError::Staging {
            reason: format!("could not create output directory {output_dir}: {e}"),
        })?;

        let filter = DirectoryFilter::new(
            self.config
                .artifacts
                .ignore_directories
                .iter()
                .chain(request.ignored_directories()),
        )?;
        let work_root = self
            .config
            .defaults
            .work_root
            .as_deref()
            .map(absolutize)
            .transpose()?;
        let mut skip = vec![output_dir.as_path()];
        skip.extend(work_root.as_deref());

        let staged = staging::stage(source_dir, work_root.as_deref(), &filter, &skip)?;
        let execution = match self.execute(&staged, document, job) {
            Ok(execution) => execution,
            Err(err) => {
                if let Err(collect_err) =
                    artifacts::collect_failure(&staged, job, &output_dir, &filter)
                {
                    tracing::warn!(error = %collect_err, "Could not copy diagnostic artifacts");
                }
                return Err(err);
            }
        };

        let (success, pdf_path, diagnostics, failure, artifacts) = match execution.failure {
            None => {
                let artifacts = artifacts::collect_success(
                    &staged,
                    job,
                    &output_dir,
                    &self.config.artifacts.on_success,
                )?;
                let pdf = output_dir.join(format!("{job}.pdf"));
                tracing::info!(pdf = %pdf, compiler_runs = execution.compiler_runs, "Compile succeeded");
                (true, Some(pdf), None, None, artifacts)
            }
            Some((failure, output)) => {
                let artifacts = artifacts::collect_failure(&staged, job, &output_dir, &filter)?;
                (false, None, Some(output), Some(failure), artifacts)
            }
        };

        Ok(CompileResult {
            success,
            job: job.to_string(),
            output_directory: output_dir.clone(),
            pdf_path,
            diagnostics,
            failure,
            passes: execution.passes,
            compiler_runs: execution.compiler_runs,
            artifacts,
            completed_at: Utc::now(),
        })
    }

    /// Compile, reporting toolchain failures as [`LatexWorkflowError::Toolchain`].
    pub fn compile(&self, request: &CompileRequest) -> Result<CompileResult, LatexWorkflowError> {
        let result = self.run(request)?;
        match result.toolchain_error() {
            Some(err) => Err(err.into()),
            None => Ok(result),
        }
    }

    fn execute(
        &self,
        staged: &StagedDocument,
        document: &str,
        job: &str,
    ) -> Result<Execution, LatexWorkflowError> {
        let dir = staged.dir();
        let max_runs = self.config.defaults.max_compiler_runs;
        let mut exec = Execution::new();

        let mut output = self.pass(&mut exec, ToolKind::Compiler, dir, document, job)?;
        if exec.failure.is_some() {
            return Ok(exec);
        }

        let mut rerun = false;
        if let Some(marker) = passes::bibliography_marker(dir, job) {
            tracing::debug!(marker = ?marker, "Bibliography pass required");
            self.pass(&mut exec, ToolKind::Bibliography, dir, document, job)?;
            if exec.failure.is_some() {
                return Ok(exec);
            }
            rerun = true;
        }
        if passes::needs_code_pass(dir, job) {
            self.pass(&mut exec, ToolKind::Code, dir, document, job)?;
            if exec.failure.is_some() {
                return Ok(exec);
            }
            rerun = true;
        }

        rerun |= rerun_requested(&passes::compiler_log(dir, job, &output.combined_string()));
        while rerun {
            if exec.compiler_runs >= max_runs {
                tracing::warn!(
                    max_compiler_runs = max_runs,
                    "Compiler still requests a rerun; giving up on further runs"
                );
                break;
            }
            output = self.pass(&mut exec, ToolKind::Compiler, dir, document, job)?;
            if exec.failure.is_some() {
                return Ok(exec);
            }
            rerun = rerun_requested(&passes::compiler_log(dir, job, &output.combined_string()));
        }

        if !staged.was_written(Utf8Path::new(&format!("{job}.pdf"))) {
            let mut diagnostics = output.combined_string();
            diagnostics.push_str(&format!("\n{job}.pdf was not produced\n"));
            exec.failure = Some((
                PassFailure {
                    tool: ToolKind::Compiler,
                    program: self.config.compiler.program.clone(),
                    exit_code: output.exit_code,
                },
                diagnostics,
            ));
        }

        Ok(exec)
    }

    /// Run one pass, recording it and noting a failure in `exec`.
    fn pass(
        &self,
        exec: &mut Execution,
        kind: ToolKind,
        dir: &Utf8Path,
        document: &str,
        job: &str,
    ) -> Result<ProcessOutput, LatexWorkflowError> {
        let tool = self.config.tool(kind);
        let cmd = passes::command_for(kind, tool, document, job, dir);

        let run = if kind == ToolKind::Compiler {
            exec.compiler_runs += 1;
            exec.compiler_runs
        } else {
            1
        };
        log_pass_start(kind.as_str(), &tool.program, run);

        let started = Instant::now();
        let output = self.runner.run(&cmd)?;
        let elapsed = started.elapsed();
        log_pass_complete(kind.as_str(), output.exit_code, elapsed.as_millis());

        exec.passes.push(PassRecord {
            tool: kind,
            program: tool.program.clone(),
            exit_code: output.exit_code,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });

        if !output.success() {
            exec.failure = Some((
                PassFailure {
                    tool: kind,
                    program: tool.program.clone(),
                    exit_code: output.exit_code,
                },
                output.combined_string(),
            ));
        }

        Ok(output)
    }
}
