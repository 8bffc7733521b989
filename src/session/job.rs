use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::state::SessionState;

/// Tracks the overall status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// The stage a session failed in, plus the most relevant cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: SessionState,
    pub cause: String,
}

/// One end-to-end pipeline run, scoped to an isolated workspace.
///
/// Owned exclusively by the orchestrator; the workspace named by
/// `id` is removed when the session reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub status: SessionStatus,
    pub state: SessionState,
    pub state_history: Vec<SessionState>,
    pub failure: Option<StageFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: SessionStatus::Pending,
            state: SessionState::Created,
            state_history: Vec::new(),
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to the next happy-path state, recording the one being left.
    /// Completion status is set when the session reaches DONE.
    pub fn advance(&mut self) -> SessionState {
        if let Some(next) = self.state.next() {
            self.state_history.push(self.state);
            self.state = next;
            self.updated_at = Utc::now();
            if next == SessionState::Done {
                self.status = SessionStatus::Completed;
            }
        }
        self.state
    }

    /// Mark the session failed in the given stage with the given cause.
    pub fn fail(&mut self, stage: SessionState, cause: String) {
        self.state_history.push(self.state);
        self.state = SessionState::Failed;
        self.status = SessionStatus::Failed;
        self.failure = Some(StageFailure { stage, cause });
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-stage item counts accumulated while the pipeline runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineCounts {
    pub staged: usize,
    pub generated: usize,
    pub generation_skipped: usize,
    pub vectorized: usize,
    pub vectorize_failed: usize,
    pub normalized: usize,
    pub normalize_failed: usize,
    pub merged: usize,
    pub merge_skipped: usize,
    pub merge_failed: usize,
    pub glyphs_composed: usize,
}

/// Structured record produced when a session terminates, successfully
/// or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub status: SessionStatus,
    pub state_transitions: Vec<SessionState>,
    pub failure: Option<StageFailure>,
    pub counts: PipelineCounts,
    pub output: Option<PathBuf>,
    pub workspace_destroy_calls: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl SessionReport {
    pub fn from_session(
        session: &Session,
        counts: PipelineCounts,
        output: Option<PathBuf>,
        workspace_destroy_calls: u32,
    ) -> Self {
        let now = Utc::now();
        let duration = now - session.created_at;
        let mut transitions = session.state_history.clone();
        transitions.push(session.state);

        Self {
            session_id: session.id.clone(),
            status: session.status,
            state_transitions: transitions,
            failure: session.failure.clone(),
            counts,
            output,
            workspace_destroy_calls,
            started_at: session.created_at,
            completed_at: now,
            duration_ms: duration.num_milliseconds(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
