use crate::events::JobState;
use crate::types::JobId;
use std::result;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown job {0}")]
    UnknownJob(JobId),
    #[error("job {0} already exists")]
    DuplicateJob(JobId),
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: JobState, to: JobState },
    #[error("job {job_id} is {state}, only terminal jobs can be removed")]
    RemovalDenied { job_id: JobId, state: JobState },
    #[error("no such job {0}")]
    NotFound(JobId),
}

pub type Result<T> = result::Result<T, Error>;
