//! Destination writes
//!
//! Commit writes rename an existing document to `<name>.backup` and then
//! write the new content. At most one backup is kept. The rename and the
//! write are not atomic together: a crash between them leaves the
//! destination absent with the previous content in the backup. Callers that
//! need atomic replacement use [`write_atomic`], which copies the backup,
//! writes a temp file and renames it into place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the destination file name for the backup copy
pub const BACKUP_SUFFIX: &str = "backup";

/// Suffix appended to the destination file name for the dry-run preview
pub const PREVIEW_SUFFIX: &str = "preview";

/// Dry-run report file name
pub const REPORT_FILE: &str = "dry-run-report.txt";

/// Destination write errors
#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("failed to back up {path} to {backup}: {source}")]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DestinationError {
    /// Path the failed operation targeted
    pub fn path(&self) -> &Path {
        match self {
            DestinationError::Backup { path, .. } | DestinationError::Write { path, .. } => path,
        }
    }
}

/// Paths touched by a committed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Destination written
    pub path: PathBuf,
    /// Backup of the previous document, if one existed
    pub backup: Option<PathBuf>,
}

/// Paths written by a dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunArtifacts {
    pub report: PathBuf,
    pub preview: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// `<destination>.backup`
pub fn backup_path(destination: &Path) -> PathBuf {
    with_suffix(destination, BACKUP_SUFFIX)
}

/// `<destination file name>.preview` inside `dir`
pub fn preview_path(dir: &Path, destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    with_suffix(&dir.join(name), PREVIEW_SUFFIX)
}

fn write_file(path: &Path, content: &str) -> Result<(), DestinationError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DestinationError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| DestinationError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the resolved document, keeping the previous one as a backup
pub fn write_document(destination: &Path, content: &str) -> Result<WriteOutcome, DestinationError> {
    let mut backup = None;

    if destination.exists() {
        let target = backup_path(destination);
        if target.exists() {
            fs::remove_file(&target).map_err(|source| DestinationError::Backup {
                path: destination.to_path_buf(),
                backup: target.clone(),
                source,
            })?;
        }
        fs::rename(destination, &target).map_err(|source| DestinationError::Backup {
            path: destination.to_path_buf(),
            backup: target.clone(),
            source,
        })?;
        tracing::info!(backup = %target.display(), "backed up existing document");
        backup = Some(target);
    }

    write_file(destination, content)?;
    tracing::info!(path = %destination.display(), bytes = content.len(), "wrote resolved document");

    Ok(WriteOutcome {
        path: destination.to_path_buf(),
        backup,
    })
}

/// Write atomically (write-then-rename), keeping a copy of the previous document
pub fn write_atomic(destination: &Path, content: &str) -> Result<WriteOutcome, DestinationError> {
    let mut backup = None;

    if destination.exists() {
        let target = backup_path(destination);
        fs::copy(destination, &target).map_err(|source| DestinationError::Backup {
            path: destination.to_path_buf(),
            backup: target.clone(),
            source,
        })?;
        backup = Some(target);
    }

    let temp_path = with_suffix(destination, "tmp");
    write_file(&temp_path, content)?;
    fs::rename(&temp_path, destination).map_err(|source| DestinationError::Write {
        path: destination.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %destination.display(), bytes = content.len(), "wrote resolved document atomically");

    Ok(WriteOutcome {
        path: destination.to_path_buf(),
        backup,
    })
}

/// Persist the dry-run report and a full preview of the resolved document
pub fn write_dry_run(
    dir: &Path,
    destination: &Path,
    report: &str,
    document: &str,
) -> Result<DryRunArtifacts, DestinationError> {
    let artifacts = DryRunArtifacts {
        report: dir.join(REPORT_FILE),
        preview: preview_path(dir, destination),
    };
    write_file(&artifacts.report, report)?;
    write_file(&artifacts.preview, document)?;
    tracing::info!(
        report = %artifacts.report.display(),
        preview = %artifacts.preview.display(),
        "dry run artifacts saved"
    );
    Ok(artifacts)
}
