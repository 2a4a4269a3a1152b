//! Deciding which passes a document needs.
//!
//! Decisions are made from the files the compiler leaves behind, never by
//! reading the document source.

use camino::Utf8Path;
use latex_workflow_config::ToolConfig;
use latex_workflow_runner::{CommandSpec, ToolKind};
use regex::Regex;
use std::fs;
use std::sync::LazyLock;

static RERUN_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Rerun to get|Label\(s\) may have changed|Please rerun LaTeX|[Rr]erun LaTeX")
        .unwrap_or_else(|e| unreachable!("rerun pattern is valid: {e}"))
});

static BIBDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\bibdata\{").unwrap_or_else(|e| unreachable!("bibdata pattern is valid: {e}"))
});

/// Which bibliography marker the compiler wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibliographyMarker {
    /// `<job>.bcf`, written by biblatex for biber
    Bcf,
    /// `\bibdata` in `<job>.aux`, written for bibtex
    Bibdata,
}

/// Check whether the bibliography tool has work to do.
#[must_use]
pub fn bibliography_marker(dir: &Utf8Path, job: &str) -> Option<BibliographyMarker> {
    if dir.join(format!("{job}.bcf")).is_file() {
        return Some(BibliographyMarker::Bcf);
    }
    let aux = fs::read(dir.join(format!("{job}.aux"))).ok()?;
    BIBDATA
        .is_match(&String::from_utf8_lossy(&aux))
        .then_some(BibliographyMarker::Bibdata)
}

/// Check whether the document has embedded code waiting to be executed.
#[must_use]
pub fn needs_code_pass(dir: &Utf8Path, job: &str) -> bool {
    dir.join(format!("{job}.pytxcode")).is_file()
}

/// Check whether compiler output asks for another run.
#[must_use]
pub fn rerun_requested(text: &str) -> bool {
    RERUN_HINT.is_match(text)
}

/// Text to scan for rerun hints: the compile log when present, else the
/// captured console output.
#[must_use]
pub fn compiler_log(dir: &Utf8Path, job: &str, console: &str) -> String {
    match fs::read(dir.join(format!("{job}.log"))) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => console.to_string(),
    }
}

/// Build the invocation for one pass.
///
/// Configured arguments come first, then the pass-specific target:
/// the document file for the compiler, the job name for the bibliography
/// tool and `<job>.pytxcode` for the code tool.
#[must_use]
pub fn command_for(
    kind: ToolKind,
    tool: &ToolConfig,
    document: &str,
    job: &str,
    cwd: &Utf8Path,
) -> CommandSpec {
    let target = match kind {
        ToolKind::Compiler => document.to_string(),
        ToolKind::Bibliography => job.to_string(),
        ToolKind::Code => format!("{job}.pytxcode"),
    };

    CommandSpec::new(&tool.program)
        .args(&tool.args)
        .arg(target)
        .cwd(cwd.as_std_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use proptest::prelude::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn utf8_temp() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    #[test]
    fn test_rerun_hints() {
        assert!(rerun_requested(
            "LaTeX Warning: Label(s) may have changed. Rerun to get cross-references right."
        ));
        assert!(rerun_requested("Package biblatex Warning: Please rerun LaTeX."));
        assert!(rerun_requested("(rerunfilecheck) Rerun to get outlines right"));
        assert!(rerun_requested("Package pythontex Warning: rerun LaTeX"));
        assert!(!rerun_requested("Output written on main.pdf (1 page, 1234 bytes)."));
        assert!(!rerun_requested("Package biblatex Warning: Please (re)run Biber on the file"));
    }

    #[test]
    fn test_bcf_marker() {
        let (_temp, dir) = utf8_temp();
        assert_eq!(bibliography_marker(&dir, "doc"), None);
        fs::write(dir.join("doc.bcf"), "<bcf/>").unwrap();
        assert_eq!(bibliography_marker(&dir, "doc"), Some(BibliographyMarker::Bcf));
    }

    #[test]
    fn test_bibdata_marker() {
        let (_temp, dir) = utf8_temp();
        fs::write(dir.join("doc.aux"), "\\relax\n\\citation{knuth}\n").unwrap();
        assert_eq!(bibliography_marker(&dir, "doc"), None);
        fs::write(dir.join("doc.aux"), "\\relax\n\\bibdata{refs}\n").unwrap();
        assert_eq!(
            bibliography_marker(&dir, "doc"),
            Some(BibliographyMarker::Bibdata)
        );
    }

    #[test]
    fn test_code_marker() {
        let (_temp, dir) = utf8_temp();
        assert!(!needs_code_pass(&dir, "doc"));
        fs::write(dir.join("doc.pytxcode"), "").unwrap();
        assert!(needs_code_pass(&dir, "doc"));
    }

    #[test]
    fn test_compiler_log_prefers_log_file() {
        let (_temp, dir) = utf8_temp();
        assert_eq!(compiler_log(&dir, "doc", "console"), "console");
        fs::write(dir.join("doc.log"), b"log \xff text").unwrap();
        assert!(compiler_log(&dir, "doc", "console").starts_with("log "));
    }

    #[test]
    fn test_command_targets() {
        let tool = ToolConfig::new("lualatex", &["-halt-on-error"]);
        let cwd = Utf8Path::new("/work");

        let cmd = command_for(ToolKind::Compiler, &tool, "doc.tex", "doc", cwd);
        assert_eq!(
            cmd.args,
            vec![OsString::from("-halt-on-error"), OsString::from("doc.tex")]
        );
        assert_eq!(cmd.cwd.as_deref(), Some(cwd.as_std_path()));

        let bib = ToolConfig::new("biber", &[]);
        let cmd = command_for(ToolKind::Bibliography, &bib, "doc.tex", "doc", cwd);
        assert_eq!(cmd.args, vec![OsString::from("doc")]);

        let code = ToolConfig::new("pythontex", &[]);
        let cmd = command_for(ToolKind::Code, &code, "doc.tex", "doc", cwd);
        assert_eq!(cmd.args, vec![OsString::from("doc.pytxcode")]);
    }

    proptest! {
        #[test]
        fn prop_text_without_hints_never_reruns(text in "[a-qs-z .:]{0,200}") {
            prop_assert!(!rerun_requested(&text));
        }

        #[test]
        fn prop_embedded_hint_always_reruns(prefix in "\\PC{0,40}", suffix in "\\PC{0,40}") {
            let log = format!("{prefix}Rerun to get cross-references right{suffix}");
            prop_assert!(rerun_requested(&log));
        }
    }
}
