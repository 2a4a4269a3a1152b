//! Atomic artifact copy
//!
//! Artifacts are copied into a temporary file next to the destination, synced,
//! then renamed over the destination. A viewer watching `paper.pdf` in the
//! output directory therefore sees either the previous PDF or the new one,
//! never a half-written file.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

#[cfg(target_os = "windows")]
use std::{thread, time::Duration};

/// Copy `src` to `dest` atomically, creating parent directories as needed.
///
/// Returns the number of bytes copied.
pub fn copy_file_atomic(src: &Path, dest: &Utf8Path) -> Result<u64> {
    let parent = dest.parent().unwrap_or_else(|| Utf8Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent directory: {parent}"))?;

    let mut source =
        File::open(src).with_context(|| format!("Failed to open {}", src.display()))?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in: {parent}"))?;

    let bytes = io::copy(&mut source, temp_file.as_file_mut())
        .with_context(|| format!("Failed to copy {} to temporary file", src.display()))?;

    temp_file
        .as_file()
        .sync_all()
        .with_context(|| "Failed to fsync temporary file")?;

    atomic_rename(temp_file, dest.as_std_path())
        .with_context(|| format!("Failed to move artifact into place: {dest}"))?;

    Ok(bytes)
}

/// Rename with bounded retry; antivirus and PDF viewers hold transient locks
/// on Windows.
#[cfg(target_os = "windows")]
fn atomic_rename(mut temp_file: NamedTempFile, target: &Path) -> Result<()> {
    use std::io::ErrorKind;

    const MAX_RETRIES: u32 = 5;
    const INITIAL_DELAY_MS: u64 = 10;

    let mut retry_count = 0;
    loop {
        match temp_file.persist(target) {
            Ok(_) => return Ok(()),
            Err(persist_error) => {
                let is_retryable = matches!(
                    persist_error.error.kind(),
                    ErrorKind::PermissionDenied | ErrorKind::Other
                );
                if retry_count >= MAX_RETRIES || !is_retryable {
                    return Err(anyhow::anyhow!(persist_error.error));
                }

                thread::sleep(Duration::from_millis(INITIAL_DELAY_MS * 2_u64.pow(retry_count)));
                retry_count += 1;
                temp_file = persist_error.file;
            }
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn atomic_rename(temp_file: NamedTempFile, target: &Path) -> Result<()> {
    temp_file
        .persist(target)
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e.error))
}
