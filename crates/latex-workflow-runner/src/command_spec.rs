use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// One tool invocation: program, argv and working directory.
///
/// Each argument stays a separate `OsString` all the way to `Command::args`.
/// Nothing is joined into a shell line, so a document named
/// `thesis; rm -rf ~.tex` reaches the compiler as a single odd file name.
///
/// ```rust
/// use latex_workflow_runner::CommandSpec;
///
/// let cmd = CommandSpec::new("lualatex")
///     .args(["-interaction=nonstopmode", "-halt-on-error"])
///     .arg("paper.tex")
///     .cwd("/tmp/work/paper");
///
/// assert_eq!(cmd.display_line(), "lualatex -interaction=nonstopmode -halt-on-error paper.tex");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// Directory the tool runs in; the caller's directory when `None`
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(self, arg: impl Into<OsString>) -> Self {
        self.args([arg])
    }

    #[must_use]
    pub fn args<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(extra.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cwd(self, dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
            ..self
        }
    }

    /// The same invocation with a different program, e.g. after `PATH` lookup.
    #[must_use]
    pub fn with_program(&self, program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..self.clone()
        }
    }

    /// Space-joined rendering for logs. Never executed.
    #[must_use]
    pub fn display_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the `std::process::Command` for this invocation.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }
}
