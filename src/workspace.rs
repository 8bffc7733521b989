//! Per-session staging workspace.
//!
//! Each session owns an isolated directory tree under the configured
//! workspace root, named by the session id. Stages only ever read from
//! their declared upstream subdirectory and write to their declared
//! output subdirectory, so concurrent sessions never touch each other's
//! files. The persistent merged-glyph directory lives outside the
//! workspace and survives teardown.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WorkspaceError;

const STAGE_DIRS: &[&str] = &["raw", "vectorized", "normalized", "final"];

/// Handle to one session's staging tree. Created all-or-nothing and
/// destroyed exactly once by the orchestrator.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    destroyed: bool,
    destroy_calls: u32,
}

impl Workspace {
    /// Allocate the staging subtree for a session. Fails if the session
    /// root already exists; on a partial failure everything created so
    /// far is removed again.
    pub fn create(workspace_root: &Path, session_id: &str) -> Result<Self, WorkspaceError> {
        let root = workspace_root.join(session_id);
        if root.exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        for dir in STAGE_DIRS {
            let path = root.join(dir);
            if let Err(source) = fs::create_dir_all(&path) {
                let _ = fs::remove_dir_all(&root);
                return Err(WorkspaceError::Create { path, source });
            }
        }

        Ok(Self {
            root,
            destroyed: false,
            destroy_calls: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raster inputs, either staged uploads or generated characters.
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// One traced outline per raster.
    pub fn vectorized_dir(&self) -> PathBuf {
        self.root.join("vectorized")
    }

    /// Canonicalized outlines ready for merging.
    pub fn normalized_dir(&self) -> PathBuf {
        self.root.join("normalized")
    }

    /// Font document and compiled binary font.
    pub fn final_dir(&self) -> PathBuf {
        self.root.join("final")
    }

    /// Copy raster files from `input_dir` into `raw/`, preserving file
    /// names. Non-file entries are ignored.
    pub fn stage_inputs(&self, input_dir: &Path) -> Result<usize, WorkspaceError> {
        let entries = fs::read_dir(input_dir).map_err(|source| WorkspaceError::Stage {
            path: input_dir.to_path_buf(),
            source,
        })?;

        let raw = self.raw_dir();
        let mut staged = 0;
        for entry in entries {
            let entry = entry.map_err(|source| WorkspaceError::Stage {
                path: input_dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let dest = raw.join(entry.file_name());
            fs::copy(&path, &dest).map_err(|source| WorkspaceError::Stage { path, source })?;
            staged += 1;
        }
        Ok(staged)
    }

    /// Recursively remove the whole subtree. Safe to call when the tree
    /// was never populated or is already gone; repeated calls are no-ops.
    pub fn destroy(&mut self) -> Result<(), WorkspaceError> {
        self.destroy_calls += 1;
        if self.destroyed {
            return Ok(());
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                self.destroyed = true;
                Ok(())
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                self.destroyed = true;
                Ok(())
            }
            Err(source) => Err(WorkspaceError::Remove {
                path: self.root.clone(),
                source,
            }),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// How many times `destroy` has been invoked on this handle.
    pub fn destroy_calls(&self) -> u32 {
        self.destroy_calls
    }
}
