use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Workspace setup/teardown failures. Always fatal for the session.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("session workspace already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to create workspace directory {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove workspace {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stage input {path}: {source}")]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure spawning or running an external tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("failed to write tool output {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Batch-level vectorize failures. Per-file trace failures are recorded
/// in the batch report instead and never abort the stage.
#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("failed to read raster directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Batch-level normalize failures. Per-file invocation failures are
/// recorded in the batch report instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to read outline directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Merge failures that prevent the stage from running at all. A failed
/// copy of an individual entry is skipped and logged, never fatal.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to read merge source {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create merge destination {path}: {source}")]
    CreateDest {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Font composition failures. Fatal: a malformed input set or a failure
/// on the output stream aborts the session.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("no glyph files matching u+<hex> found in {0}")]
    EmptyGlyphSet(PathBuf),

    #[error("failed to read glyph directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read glyph outline {path}: {source}")]
    ReadGlyph {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write font document {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Font compilation failures. Deterministic given a fixed input, so
/// never retried.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to spawn font compiler `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("font compiler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("font compiler produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("font compiler produced an empty file at {0}")]
    EmptyOutput(PathBuf),
}

/// One failed generation attempt. Every variant consumes a retry.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("generation API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unparsable generation response: {0}")]
    Parse(String),

    #[error("generation response contained no image reference")]
    MissingImage,

    #[error("failed to download generated image from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("downloaded image was empty")]
    EmptyImage,

    #[error("reference image {path} is unusable: {reason}")]
    Reference { path: PathBuf, reason: String },

    #[error("failed to save generated image {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Terminal failure for one character after the retry budget is spent.
/// Fatal for that character only; session policy decides whether the
/// whole job aborts.
#[derive(Debug, Error)]
#[error("failed to generate '{character}' after {attempts} attempts: {last}")]
pub struct GenerationError {
    pub character: char,
    pub attempts: u32,
    #[source]
    pub last: GenerationFailure,
}

/// A stage-level pipeline failure, tagged with the stage it occurred in.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("vectorize error: {0}")]
    Vectorize(#[from] VectorizeError),

    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("failed to deliver compiled font to {path}: {source}")]
    Deliver {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The session state the failure belongs to, for the failing-stage
    /// indicator surfaced to the caller.
    pub fn stage(&self) -> SessionState {
        match self {
            PipelineError::Workspace(_) | PipelineError::Generation(_) => SessionState::Staging,
            PipelineError::Vectorize(_) => SessionState::Vectorizing,
            PipelineError::Normalize(_) => SessionState::Normalizing,
            PipelineError::Merge(_) => SessionState::Merging,
            PipelineError::Compose(_) => SessionState::Composing,
            PipelineError::Compile(_) | PipelineError::Deliver { .. } => SessionState::Compiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_display_carries_last_cause() {
        let err = GenerationError {
            character: '的',
            attempts: 3,
            last: GenerationFailure::ApiStatus {
                status: 500,
                body: "boom".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("status 500"));
    }

    #[test]
    fn pipeline_error_maps_to_failing_stage() {
        let err = PipelineError::Compose(ComposeError::EmptyGlyphSet("merged".into()));
        assert_eq!(err.stage(), SessionState::Composing);

        let err = PipelineError::Compile(CompileError::Failed {
            status: "exit status: 1".into(),
            stderr: "bad svg".into(),
        });
        assert_eq!(err.stage(), SessionState::Compiling);
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineError>();
        assert_send_sync::<GenerationError>();
    }
}
