//! Helpers shared by tests across the workspace.

use std::fs;
use std::path::{Path, PathBuf};

/// Check whether tests against a real TeX installation should run.
///
/// `LATEX_WORKFLOW_SKIP_REAL_TOOLCHAIN_TESTS=1` always disables them.
/// `LATEX_WORKFLOW_REAL_TOOLCHAIN_TESTS=1` enables them.
#[must_use]
pub fn real_toolchain_tests_enabled() -> bool {
    let flag = |name: &str| {
        std::env::var(name)
            .ok()
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };

    if flag("LATEX_WORKFLOW_SKIP_REAL_TOOLCHAIN_TESTS") {
        return false;
    }
    flag("LATEX_WORKFLOW_REAL_TOOLCHAIN_TESTS")
}

pub const PLAIN_DOC: &str = r"\documentclass{article}
\begin{document}
Hello, world.
\end{document}
";

pub const DOC_WITH_XREF: &str = r"\documentclass{article}
\begin{document}
See section~\ref{sec:later}.
\section{Later}\label{sec:later}
\end{document}
";

pub const DOC_WITH_BIB: &str = r"\documentclass{article}
\usepackage[backend=biber]{biblatex}
\addbibresource{refs.bib}
\begin{document}
Knuth wrote about this~\cite{knuth1984}.
\printbibliography
\end{document}
";

pub const DOC_WITH_PYTHON: &str = r"\documentclass{article}
\usepackage{pythontex}
\begin{document}
Two plus two is \py{2 + 2}.
\end{document}
";

pub const MALFORMED_DOC: &str = r"\documentclass{article}
\begin{document}
\thiscommanddoesnotexist
\end{document}
";

pub const REFS_BIB: &str = r"@book{knuth1984,
  author = {Donald E. Knuth},
  title = {The {\TeX}book},
  publisher = {Addison-Wesley},
  year = {1984},
}
";

/// Write `contents` to `dir/name`, creating `dir` if needed, and return the path.
pub fn write_document(dir: &Path, name: &str, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create document directory");
    let path = dir.join(name);
    fs::write(&path, contents).expect("write document");
    path
}
