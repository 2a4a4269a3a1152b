//! Copying results out of the working area.

use camino::{Utf8Path, Utf8PathBuf};
use latex_workflow_utils::atomic_write::copy_file_atomic;
use latex_workflow_utils::error::LatexWorkflowError;
use latex_workflow_utils::paths::{DirectoryFilter, to_utf8};
use walkdir::WalkDir;

use super::staging::StagedDocument;

/// Copy `<job>.pdf`, then `<job>.<ext>` for each other extension in
/// `extensions`.
///
/// The PDF is always copied; the caller has checked it exists. Other missing
/// files are skipped.
pub fn collect_success(
    staged: &StagedDocument,
    job: &str,
    output_dir: &Utf8Path,
    extensions: &[String],
) -> Result<Vec<Utf8PathBuf>, LatexWorkflowError> {
    let pdf = format!("{job}.pdf");
    let dest = output_dir.join(&pdf);
    copy(&staged.dir().join(&pdf), &dest)?;
    let mut copied = vec![dest];

    for ext in extensions.iter().filter(|ext| ext.as_str() != "pdf") {
        let name = format!("{job}.{ext}");
        let src = staged.dir().join(&name);
        if !src.is_file() {
            tracing::debug!(file = %name, "No artifact to copy");
            continue;
        }
        let dest = output_dir.join(&name);
        copy(&src, &dest)?;
        copied.push(dest);
    }

    Ok(copied)
}

/// Copy every file the toolchain wrote, plus `<job>.log`.
///
/// Files staged from the source tree count as written once the toolchain
/// rewrites them, so stale auxiliary files from an in-place build do not hide
/// fresh ones.
///
/// Relative paths are preserved so auxiliary directories such as
/// `pythontex-files-<job>/` keep their layout.
pub fn collect_failure(
    staged: &StagedDocument,
    job: &str,
    output_dir: &Utf8Path,
    filter: &DirectoryFilter,
) -> Result<Vec<Utf8PathBuf>, LatexWorkflowError> {
    let log_name = format!("{job}.log");
    let mut copied = Vec::new();

    let walker = WalkDir::new(staged.dir())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !filter.is_ignored(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry.map_err(|e| LatexWorkflowError::Artifact {
            path: staged.dir().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = to_utf8(entry.path())?;
        let Ok(relative) = path.strip_prefix(staged.dir()) else {
            continue;
        };
        if !staged.was_written(relative) && relative.as_str() != log_name {
            continue;
        }

        let dest = output_dir.join(relative);
        copy(&path, &dest)?;
        copied.push(dest);
    }

    tracing::info!(
        count = copied.len(),
        output_dir = %output_dir,
        "Copied diagnostic artifacts"
    );

    Ok(copied)
}

fn copy(src: &Utf8Path, dest: &Utf8Path) -> Result<(), LatexWorkflowError> {
    copy_file_atomic(src.as_std_path(), dest).map_err(|e| LatexWorkflowError::Artifact {
        path: src.to_string(),
        reason: format!("{e:#}"),
    })?;
    tracing::debug!(from = %src, to = %dest, "Copied artifact");
    Ok(())
}
