//! End-to-end tests driving latex-workflow against the latex-stub toolchain
//!
//! These tests execute the compiled binaries directly using `assert_cmd`.
//! They are gated behind the `dev-tools` feature and only run when that feature is enabled.
//!
//! Run with: `cargo test --features dev-tools --test latex_stub_cli`

use assert_cmd::assert::OutputAssertExt;
use latex_workflow::{CompileRequest, LatexWorkflowError, ToolKind, compile_latex};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const STUB: &str = env!("CARGO_BIN_EXE_latex-stub");

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// A copy of the fixtures with a config routing every tool to latex-stub.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    for entry in fs::read_dir(fixtures_dir()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), temp.path().join(entry.file_name())).unwrap();
    }

    let config_dir = temp.path().join(".latex-workflow");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), stub_config(None)).unwrap();
    temp
}

fn stub_config(bibliography_exit_code: Option<u8>) -> String {
    let bibliography_args = match bibliography_exit_code {
        Some(code) => format!(r#"["--role", "bibliography", "--exit-code", "{code}"]"#),
        None => r#"["--role", "bibliography"]"#.to_string(),
    };
    format!(
        r#"
[compiler]
program = '{STUB}'
args = ["--role", "compiler"]

[bibliography]
program = '{STUB}'
args = {bibliography_args}

[code]
program = '{STUB}'
args = ["--role", "code"]
"#
    )
}

fn workflow_cmd(project: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("latex-workflow"));
    cmd.current_dir(project);
    cmd.env_remove("LATEX_WORKFLOW_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn compile_json(project: &Path, document: &str) -> serde_json::Value {
    let output = workflow_cmd(project)
        .args([document, "--output-directory", "out", "--json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn tools(result: &serde_json::Value) -> Vec<String> {
    result["passes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pass| pass["tool"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn stub_version_output() {
    Command::new(STUB)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("latex-stub"));
}

#[test]
fn plain_document_with_relative_output_directory() {
    let project = project();

    workflow_cmd(project.path())
        .args(["plain-doc.tex", "--output-directory", "out"])
        .arg("--ignore-directory")
        .arg("out")
        .assert()
        .success();

    assert!(project.path().join("out/plain-doc.pdf").is_file());
    assert!(!project.path().join("out/plain-doc.log").exists());
}

#[test]
fn plain_document_with_absolute_output_directory() {
    let project = project();
    let out = TempDir::new().unwrap();

    workflow_cmd(project.path())
        .arg("plain-doc.tex")
        .arg("--output-directory")
        .arg(out.path())
        .assert()
        .success();

    assert!(out.path().join("plain-doc.pdf").is_file());
}

#[test]
fn bibliography_document_runs_biber_then_compiler() {
    let project = project();

    let result = compile_json(project.path(), "doc-with-bib.tex");

    assert_eq!(tools(&result), ["compiler", "bibliography", "compiler"]);
    let pdf = fs::read_to_string(project.path().join("out/doc-with-bib.pdf")).unwrap();
    assert!(pdf.contains("bibliography: resolved"));
}

#[test]
fn python_document_runs_code_pass_then_compiler() {
    let project = project();

    let result = compile_json(project.path(), "doc-with-python.tex");

    assert_eq!(tools(&result), ["compiler", "code", "compiler"]);
    let pdf = fs::read_to_string(project.path().join("out/doc-with-python.pdf")).unwrap();
    assert!(pdf.contains("code: executed"));
}

#[test]
fn bibliography_and_python_document() {
    let project = project();

    let result = compile_json(project.path(), "doc-with-bib-and-python.tex");

    assert_eq!(
        tools(&result),
        ["compiler", "bibliography", "code", "compiler"]
    );
    let pdf =
        fs::read_to_string(project.path().join("out/doc-with-bib-and-python.pdf")).unwrap();
    assert!(pdf.contains("bibliography: resolved"));
    assert!(pdf.contains("code: executed"));
}

#[test]
fn cross_references_rerun_the_compiler() {
    let project = project();

    let result = compile_json(project.path(), "doc-with-xref.tex");

    assert_eq!(result["compiler_runs"], 2);
    assert_eq!(result["success"], true);
}

#[test]
fn malformed_document_exits_one_and_keeps_diagnostics() {
    let project = project();

    workflow_cmd(project.path())
        .args(["malformed-doc.tex", "--output-directory", "out"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Undefined control sequence"))
        .stderr(predicate::str::contains("compiler"));

    let out = project.path().join("out");
    assert!(out.join("malformed-doc.log").is_file());
    assert!(!out.join("malformed-doc.pdf").exists());
    assert!(!out.join("malformed-doc.tex").exists());
}

#[test]
fn failing_bibliography_tool_exits_one() {
    let project = project();
    let config = project.path().join("failing-biber.toml");
    fs::write(&config, stub_config(Some(2))).unwrap();

    workflow_cmd(project.path())
        .args(["doc-with-bib.tex", "--output-directory", "out", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bibliography"))
        .stderr(predicate::str::contains("exit code 2"));

    assert!(project.path().join("out/doc-with-bib.bcf").is_file());
}

#[test]
fn concurrent_compiles_each_succeed() {
    let project = project();
    let documents = [
        "plain-doc.tex",
        "doc-with-bib.tex",
        "doc-with-python.tex",
        "doc-with-bib-and-python.tex",
    ];
    let outs: Vec<TempDir> = documents.iter().map(|_| TempDir::new().unwrap()).collect();

    let handles: Vec<_> = documents
        .iter()
        .zip(&outs)
        .map(|(document, out)| {
            let mut cmd = workflow_cmd(project.path());
            cmd.arg(document).arg("--output-directory").arg(out.path());
            std::thread::spawn(move || cmd.output().unwrap())
        })
        .collect();

    for ((handle, document), out) in handles.into_iter().zip(documents).zip(&outs) {
        let output = handle.join().unwrap();
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stem = document.trim_end_matches(".tex");
        assert!(out.path().join(format!("{stem}.pdf")).is_file());
    }
}

#[test]
fn library_compile_discovers_project_config() {
    let project = project();
    let root = camino::Utf8PathBuf::from_path_buf(project.path().to_path_buf()).unwrap();

    let result = compile_latex(
        &CompileRequest::new(root.join("doc-with-bib.tex"), root.join("out"))
            .ignore_directories(["out"]),
    )
    .unwrap();
    assert_eq!(result.pdf_path, Some(root.join("out/doc-with-bib.pdf")));
    assert_eq!(
        result.pass_tools(),
        vec![ToolKind::Compiler, ToolKind::Bibliography, ToolKind::Compiler]
    );

    let err = compile_latex(&CompileRequest::new(
        root.join("malformed-doc.tex"),
        root.join("failed"),
    ))
    .unwrap_err();
    assert!(matches!(err, LatexWorkflowError::Toolchain(_)));
    assert!(root.join("failed/malformed-doc.log").is_file());
}
