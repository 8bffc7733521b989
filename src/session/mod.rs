mod job;
mod state;

pub use job::{PipelineCounts, Session, SessionReport, SessionStatus, StageFailure};
pub use state::SessionState;
