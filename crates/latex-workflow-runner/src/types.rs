//! Types used by the runner module

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an external program plays in a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Document compiler (lualatex, pdflatex, ...)
    Compiler,
    /// Bibliography processor (biber, bibtex)
    Bibliography,
    /// Embedded-code execution pass (pythontex)
    Code,
}

impl ToolKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Compiler => "compiler",
            Self::Bibliography => "bibliography",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
