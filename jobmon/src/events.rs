use crate::types::{JobId, Timestamp};
use std::{fmt, str::FromStr};

/// Lifecycle state of a tracked job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobState {
    Waiting,
    Running,
    Success,
    Failed,
    Stopped,
}

impl JobState {
    pub const ALL: [JobState; 5] = [
        JobState::Waiting,
        JobState::Running,
        JobState::Success,
        JobState::Failed,
        JobState::Stopped,
    ];

    /// Terminal states accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, JobState::Success | JobState::Failed | JobState::Stopped)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            JobState::Waiting => "waiting",
            JobState::Running => "running",
            JobState::Success => "success",
            JobState::Failed => "failed",
            JobState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised job state `{0}`")]
pub struct ParseStateError(String);

impl FromStr for JobState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// A committed state change, as seen by feed subscribers and the durability hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionEvent {
    pub job_id: JobId,
    pub from: JobState,
    pub to: JobState,
    pub at: Timestamp,
}
