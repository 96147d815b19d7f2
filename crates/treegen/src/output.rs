// crates/treegen/src/output.rs
// ============================================================================
// Module: Output Writer
// Description: Staged, replace-in-place writes and drift checks.
// Purpose: Never leave a half-written generated file behind.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every output is first written to a temporary sibling and synced. Only when
//! all outputs are staged are they renamed over their destinations, so a
//! failure while staging leaves existing files untouched. While renaming,
//! each replaced file is parked in a backup sibling; if a later rename fails,
//! earlier destinations are restored from their backups (or removed when they
//! did not exist) so the set never ends up mixing old and new files. Parent
//! directories are created as needed.

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::error::ExportError;

// ============================================================================
// CONSTANTS: Temporary output file handling
// ============================================================================

/// Attempts at finding an unused temporary name.
const TEMP_ATTEMPTS: usize = 16;
/// Process-wide counter making temporary names unique.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Types
// ============================================================================

/// One output staged for replacement.
struct StagedOutput<'a> {
    /// Synced temporary sibling holding the new contents.
    temp_path: PathBuf,
    /// Destination path.
    path: &'a Path,
    /// Previous destination contents, parked while the set is replaced.
    backup: Option<PathBuf>,
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Writes every `(path, contents)` pair, replacing existing files.
///
/// # Errors
/// Returns [`ExportError::Filesystem`] naming the failing path. Temporary
/// files are removed and already replaced destinations are restored on
/// failure.
pub fn write_outputs(outputs: &[(&Path, &str)]) -> Result<(), ExportError> {
    let mut staged: Vec<StagedOutput<'_>> = Vec::with_capacity(outputs.len());
    for &(path, contents) in outputs {
        match stage_output(path, contents) {
            Ok(temp_path) => staged.push(StagedOutput {
                temp_path,
                path,
                backup: None,
            }),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }
    let mut failure = None;
    for (index, output) in staged.iter_mut().enumerate() {
        if let Err(err) = replace_output(output) {
            failure = Some((index, err));
            break;
        }
    }
    if let Some((index, err)) = failure {
        if let Some(backup) = &staged[index].backup {
            let _ = persist_temp_output(backup, staged[index].path);
        }
        roll_back(&staged[.. index]);
        discard(&staged[index ..]);
        return Err(err);
    }
    for output in &staged {
        if let Some(backup) = &output.backup {
            let _ = fs::remove_file(backup);
        }
    }
    Ok(())
}

/// Compares every `(path, contents)` pair against the file on disk.
///
/// # Errors
/// Returns [`ExportError::Filesystem`] when a file cannot be read and
/// [`ExportError::Drift`] listing every path whose contents differ.
pub fn check_outputs(outputs: &[(&Path, &str)]) -> Result<(), ExportError> {
    let mut drifted = Vec::new();
    for &(path, contents) in outputs {
        let existing = fs::read(path).map_err(|err| ExportError::filesystem(path, err))?;
        if existing != contents.as_bytes() {
            drifted.push(path.display().to_string());
        }
    }
    if drifted.is_empty() {
        return Ok(());
    }
    Err(ExportError::Drift(format!(
        "{} differs from the generated output; run treegen export",
        drifted.join(", ")
    )))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes `contents` to a synced temporary sibling of `path`.
fn stage_output(path: &Path, contents: &str) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| ExportError::filesystem(parent, err))?;
    }
    let (temp_path, mut file) = create_temp_output(path)?;
    let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(ExportError::filesystem(path, err));
    }
    Ok(temp_path)
}

/// Creates a unique temporary output file alongside the destination.
fn create_temp_output(path: &Path) -> Result<(PathBuf, fs::File), ExportError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ExportError::filesystem(path, "output path does not include a file name"))?;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => return Ok((temp_path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
            Err(err) => return Err(ExportError::filesystem(&temp_path, err)),
        }
    }
    Err(ExportError::filesystem(path, "failed to allocate temporary output path"))
}

/// Moves a staged file over its destination.
///
/// On platforms without atomic replace this falls back to remove-and-rename.
fn persist_temp_output(temp_path: &Path, path: &Path) -> Result<(), ExportError> {
    match fs::rename(temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.is_file() {
                fs::remove_file(path).map_err(|err| ExportError::filesystem(path, err))?;
                fs::rename(temp_path, path).map_err(|err| ExportError::filesystem(path, err))?;
                return Ok(());
            }
            Err(ExportError::filesystem(path, err))
        }
    }
}

/// Parks any existing destination in a backup, then persists the staged file.
fn replace_output(output: &mut StagedOutput<'_>) -> Result<(), ExportError> {
    if output.path.is_file() {
        let (backup, file) = create_temp_output(output.path)?;
        drop(file);
        if let Err(err) = persist_temp_output(output.path, &backup) {
            let _ = fs::remove_file(&backup);
            return Err(err);
        }
        output.backup = Some(backup);
    }
    persist_temp_output(&output.temp_path, output.path)
}

/// Restores fully replaced destinations to their previous state.
fn roll_back(replaced: &[StagedOutput<'_>]) {
    for output in replaced.iter().rev() {
        match &output.backup {
            Some(backup) => {
                let _ = persist_temp_output(backup, output.path);
            }
            None => {
                let _ = fs::remove_file(output.path);
            }
        }
    }
}

/// Removes staged temporaries that were not persisted.
fn discard(staged: &[StagedOutput<'_>]) {
    for output in staged {
        let _ = fs::remove_file(&output.temp_path);
    }
}
