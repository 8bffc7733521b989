//! Idempotent merge into the persistent glyph directory.
//!
//! The merged-glyph directory accumulates normalized outlines across
//! runs. Entries already present are authoritative: the merge skips
//! them and only copies files that do not exist yet, recursively
//! mirroring subdirectories. Nothing is ever deleted or overwritten, so
//! re-running the merge is always safe and concurrent sessions cannot
//! clobber each other's glyphs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

/// Per-entry results of one merge run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    /// Entries that failed to copy, with the cause. Non-fatal.
    pub failed: Vec<(String, String)>,
}

impl MergeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} copied, {} skipped, {} failed",
            self.copied.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Copy every entry under `source` that does not already exist under
/// `dest` (first-writer-wins). Individual copy failures are recorded
/// and skipped.
pub fn merge_new_files(source: &Path, dest: &Path) -> Result<MergeReport, MergeError> {
    let mut report = MergeReport::default();
    merge_dir(source, dest, "", &mut report)?;
    Ok(report)
}

fn merge_dir(
    source: &Path,
    dest: &Path,
    prefix: &str,
    report: &mut MergeReport,
) -> Result<(), MergeError> {
    fs::create_dir_all(dest).map_err(|source| MergeError::CreateDest {
        path: dest.to_path_buf(),
        source,
    })?;

    let entries = fs::read_dir(source).map_err(|io| MergeError::ReadDir {
        path: source.to_path_buf(),
        source: io,
    })?;

    let mut names: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name())
        .collect();
    names.sort();

    for name in names {
        let rel = if prefix.is_empty() {
            name.to_string_lossy().into_owned()
        } else {
            format!("{prefix}/{}", name.to_string_lossy())
        };
        let src_path = source.join(&name);
        let dst_path = dest.join(&name);

        if src_path.is_dir() {
            merge_dir(&src_path, &dst_path, &rel, report)?;
        } else if dst_path.exists() {
            report.skipped.push(rel);
        } else {
            match fs::copy(&src_path, &dst_path) {
                Ok(_) => report.copied.push(rel),
                Err(err) => report.failed.push((rel, err.to_string())),
            }
        }
    }
    Ok(())
}
