use crate::error;
use crate::events::JobState;
use crate::record::JobRecord;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum JobMessage {
    Transition {
        target: JobState,
        response: oneshot::Sender<error::Result<JobRecord>>,
    },
    Snapshot {
        response: oneshot::Sender<JobRecord>,
    },
    Retire {
        response: oneshot::Sender<error::Result<()>>,
    },
}
