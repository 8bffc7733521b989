use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle states of a pipeline session.
///
/// A session flows through
/// CREATED → STAGING → VECTORIZING → NORMALIZING → MERGING → COMPOSING →
/// COMPILING → DONE, or lands in FAILED from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Created,
    Staging,
    Vectorizing,
    Normalizing,
    Merging,
    Composing,
    Compiling,
    Done,
    Failed,
}

impl SessionState {
    /// The next state on the happy path, or `None` from a terminal state.
    pub fn next(self) -> Option<SessionState> {
        match self {
            SessionState::Created => Some(SessionState::Staging),
            SessionState::Staging => Some(SessionState::Vectorizing),
            SessionState::Vectorizing => Some(SessionState::Normalizing),
            SessionState::Normalizing => Some(SessionState::Merging),
            SessionState::Merging => Some(SessionState::Composing),
            SessionState::Composing => Some(SessionState::Compiling),
            SessionState::Compiling => Some(SessionState::Done),
            SessionState::Done | SessionState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Created => "CREATED",
            SessionState::Staging => "STAGING",
            SessionState::Vectorizing => "VECTORIZING",
            SessionState::Normalizing => "NORMALIZING",
            SessionState::Merging => "MERGING",
            SessionState::Composing => "COMPOSING",
            SessionState::Compiling => "COMPILING",
            SessionState::Done => "DONE",
            SessionState::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}
