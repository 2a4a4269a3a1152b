//! Copying the document directory into a private working area.

use camino::{Utf8Path, Utf8PathBuf};
use latex_workflow_utils::error::LatexWorkflowError;
use latex_workflow_utils::paths::{DirectoryFilter, to_utf8};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Size and modification time of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Utf8Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// A staged copy of a document directory.
///
/// The working area is removed when this value is dropped.
#[derive(Debug)]
pub struct StagedDocument {
    _temp: TempDir,
    dir: Utf8PathBuf,
    staged: HashMap<Utf8PathBuf, FileStamp>,
}

impl StagedDocument {
    /// Root of the working area; the compiler runs here.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Whether `relative` was copied from the source directory.
    #[cfg(test)]
    pub fn was_staged(&self, relative: &Utf8Path) -> bool {
        self.staged.contains_key(relative)
    }

    /// Whether `relative` was written in the working area after staging.
    ///
    /// True for new files and for staged files whose size or modification
    /// time has changed since they were copied in.
    #[must_use]
    pub fn was_written(&self, relative: &Utf8Path) -> bool {
        let Some(current) = FileStamp::of(&self.dir.join(relative)) else {
            return false;
        };
        self.staged.get(relative) != Some(&current)
    }

    #[cfg(test)]
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

/// Copy `source_dir` into a fresh temporary directory.
///
/// Directories matched by `filter` are skipped at any depth, as is any
/// directory listed in `skip` (the output directory and the work root when
/// they live inside the source tree). `skip` entries are compared after
/// resolving symlinks and `..`, so relative or unnormalized paths match.
pub fn stage(
    source_dir: &Utf8Path,
    work_root: Option<&Utf8Path>,
    filter: &DirectoryFilter,
    skip: &[&Utf8Path],
) -> Result<StagedDocument, LatexWorkflowError> {
    let temp = new_work_dir(work_root)?;
    let dir = to_utf8(temp.path())?;
    let mut staged = HashMap::new();

    let skip: Vec<PathBuf> = skip
        .iter()
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect();

    let walker = WalkDir::new(source_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if filter.is_ignored(&name) {
                return false;
            }
            fs::canonicalize(entry.path()).map_or(true, |real| !skip.contains(&real))
        });

    for entry in walker {
        let entry = entry.map_err(|e| LatexWorkflowError::Staging {
            reason: e.to_string(),
        })?;
        let path = to_utf8(entry.path())?;
        let Ok(relative) = path.strip_prefix(source_dir) else {
            continue;
        };
        if relative.as_str().is_empty() {
            continue;
        }
        let target = dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| staging_error(&path, &e))?;
        } else if path.is_file() {
            // Follows symlinks to files; dangling links and symlinked dirs are skipped
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| staging_error(&path, &e))?;
            }
            fs::copy(&path, &target).map_err(|e| staging_error(&path, &e))?;
            if let Some(stamp) = FileStamp::of(&target) {
                staged.insert(relative.to_path_buf(), stamp);
            }
        }
    }

    tracing::debug!(
        source = %source_dir,
        work_dir = %dir,
        files = staged.len(),
        "Staged document directory"
    );

    Ok(StagedDocument {
        _temp: temp,
        dir,
        staged,
    })
}

fn new_work_dir(work_root: Option<&Utf8Path>) -> Result<TempDir, LatexWorkflowError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("latex-workflow-");

    let result = match work_root {
        Some(root) => {
            fs::create_dir_all(root).map_err(|e| staging_error(root, &e))?;
            builder.tempdir_in(root)
        }
        None => builder.tempdir(),
    };

    result.map_err(|e| LatexWorkflowError::Staging {
        reason: format!("could not create working directory: {e}"),
    })
}

fn staging_error(path: &Utf8Path, err: &std::io::Error) -> LatexWorkflowError {
    LatexWorkflowError::Staging {
        reason: format!("{path}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8_temp() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        (temp, path)
    }

    fn touch(path: &Utf8Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_stage_copies_tree_and_records_files() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("main.tex"));
        touch(&src.join("chapters/intro.tex"));
        touch(&src.join("figures/plot.pdf"));

        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        let staged = stage(&src, None, &filter, &[]).unwrap();

        assert!(staged.dir().join("chapters/intro.tex").is_file());
        assert!(staged.was_staged(Utf8Path::new("main.tex")));
        assert!(staged.was_staged(Utf8Path::new("figures/plot.pdf")));
        assert_eq!(staged.staged_count(), 3);
    }

    #[test]
    fn test_stage_skips_ignored_and_vcs_directories() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("main.tex"));
        touch(&src.join("out/main.pdf"));
        touch(&src.join("chapters/out/old.pdf"));
        touch(&src.join(".git/HEAD"));

        let filter = DirectoryFilter::new(["out"]).unwrap();
        let staged = stage(&src, None, &filter, &[]).unwrap();

        assert!(!staged.dir().join("out").exists());
        assert!(!staged.dir().join("chapters/out").exists());
        assert!(!staged.dir().join(".git").exists());
        assert_eq!(staged.staged_count(), 1);
    }

    #[test]
    fn test_stage_skips_explicit_paths() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("main.tex"));
        touch(&src.join("build/main.pdf"));

        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        let build = src.join("build");
        let staged = stage(&src, None, &filter, &[&build]).unwrap();

        assert!(!staged.dir().join("build").exists());
    }

    #[test]
    fn test_work_root_is_created_and_cleaned_up() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("main.tex"));
        let (_root_temp, root) = utf8_temp();
        let work_root = root.join("nested/work");

        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        let staged = stage(&src, Some(&work_root), &filter, &[]).unwrap();
        let dir = staged.dir().to_path_buf();
        assert!(dir.starts_with(&work_root));

        drop(staged);
        assert!(!dir.exists());
    }

    #[test]
    fn test_work_root_inside_source_is_not_staged_into_itself() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("main.tex"));
        fs::create_dir_all(src.join("chapters")).unwrap();
        let work_root = src.join("chapters/../build");

        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        let staged = stage(&src, Some(&work_root), &filter, &[&work_root]).unwrap();

        assert!(staged.dir().starts_with(&work_root));
        assert!(!staged.dir().join("build").exists());
        assert_eq!(staged.staged_count(), 1);
    }

    #[test]
    fn test_rewritten_staged_file_counts_as_written() {
        let (_src_temp, src) = utf8_temp();
        touch(&src.join("doc.tex"));
        fs::write(src.join("doc.bcf"), "<stale/>").unwrap();

        let filter = DirectoryFilter::new(Vec::<String>::new()).unwrap();
        let staged = stage(&src, None, &filter, &[]).unwrap();

        assert!(!staged.was_written(Utf8Path::new("doc.bcf")));
        assert!(!staged.was_written(Utf8Path::new("doc.aux")));

        fs::write(staged.dir().join("doc.bcf"), "<bcf>fresh</bcf>").unwrap();
        fs::write(staged.dir().join("doc.aux"), "\\relax").unwrap();

        assert!(staged.was_staged(Utf8Path::new("doc.bcf")));
        assert!(staged.was_written(Utf8Path::new("doc.bcf")));
        assert!(staged.was_written(Utf8Path::new("doc.aux")));
        assert!(!staged.was_written(Utf8Path::new("doc.tex")));
    }
}
