//! Path helpers: absolute path resolution and directory exclusion.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::LatexWorkflowError;

/// Directory names never staged or collected.
pub const ALWAYS_IGNORED: &[&str] = &[".git", ".hg", ".svn"];

/// Make `path` absolute against the process working directory, lexically.
///
/// Symlinks are not resolved, so the path a user typed stays recognisable in
/// messages.
pub fn absolutize(path: &Utf8Path) -> Result<Utf8PathBuf, LatexWorkflowError> {
    let absolute = std::path::absolute(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(absolute).map_err(|p| LatexWorkflowError::InvalidRequest {
        reason: format!("path is not valid UTF-8: {}", p.display()),
    })
}

/// Convert a std path to UTF-8, reporting non-UTF-8 paths as request errors.
pub fn to_utf8(path: &Path) -> Result<Utf8PathBuf, LatexWorkflowError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|p| {
        LatexWorkflowError::InvalidRequest {
            reason: format!("path is not valid UTF-8: {}", p.display()),
        }
    })
}

/// Matches directory names that must be skipped while staging a document and
/// while collecting artifacts.
///
/// Entries are matched against a single directory *name* at any depth, so
/// `out` skips both `./out` and `./chapters/out`. Entries may be glob patterns
/// (`build-*`).
#[derive(Debug, Clone)]
pub struct DirectoryFilter {
    set: GlobSet,
    patterns: Vec<String>,
}

impl DirectoryFilter {
    pub fn new<I, S>(names: I) -> Result<Self, LatexWorkflowError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for name in ALWAYS_IGNORED
            .iter()
            .map(|s| (*s).to_string())
            .chain(names.into_iter().map(|s| s.as_ref().trim_matches('/').to_string()))
        {
            if name.is_empty() || patterns.contains(&name) {
                continue;
            }
            let glob = Glob::new(&name).map_err(|e| LatexWorkflowError::InvalidRequest {
                reason: format!("invalid ignore pattern '{name}': {e}"),
            })?;
            builder.add(glob);
            patterns.push(name);
        }

        let set = builder
            .build()
            .map_err(|e| LatexWorkflowError::InvalidRequest {
                reason: format!("invalid ignore patterns: {e}"),
            })?;

        Ok(Self { set, patterns })
    }

    /// Whether a directory with this name is excluded.
    #[must_use]
    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.set.is_match(dir_name)
    }

    /// The effective patterns, including the built-in ones.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_names_match_exactly() {
        let filter = DirectoryFilter::new(["out"]).unwrap();
        assert!(filter.is_ignored("out"));
        assert!(!filter.is_ignored("outline"));
        assert!(!filter.is_ignored("figures"));
    }

    #[test]
    fn test_vcs_directories_always_ignored() {
        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        assert!(filter.is_ignored(".git"));
        assert!(filter.patterns().len() >= 3);
    }

    #[test]
    fn test_glob_patterns() {
        let filter = DirectoryFilter::new(["build-*"]).unwrap();
        assert!(filter.is_ignored("build-debug"));
        assert!(!filter.is_ignored("rebuild"));
    }

    #[test]
    fn test_trailing_slash_and_duplicates() {
        let filter = DirectoryFilter::new(["out/", "out", ""]).unwrap();
        assert_eq!(filter.patterns().iter().filter(|p| *p == "out").count(), 1);
        assert!(filter.is_ignored("out"));
    }

    #[test]
    fn test_invalid_glob_is_request_error() {
        let err = DirectoryFilter::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, LatexWorkflowError::InvalidRequest { .. }));
    }

    #[test]
    fn test_absolutize_relative_path() {
        let abs = absolutize(Utf8Path::new("doc.tex")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("doc.tex"));
    }

    proptest! {
        #[test]
        fn prop_literal_names_ignore_themselves(name in "[a-z][a-z0-9_-]{0,12}") {
            let filter = DirectoryFilter::new([name.as_str()]).unwrap();
            prop_assert!(filter.is_ignored(&name));
            let other = format!("{name}x");
            prop_assert!(!filter.is_ignored(&other));
        }
    }
}
