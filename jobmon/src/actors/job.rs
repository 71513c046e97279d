mod actor;
mod messages;

use crate::error::{Error, Result};
use crate::events::JobState;
use crate::lifecycle::Notifier;
use crate::record::JobRecord;
use crate::types::JobId;
use actor::Actor;
use messages::JobMessage;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Handle to the task that owns a single job's record.
///
/// Every mutation of the record goes through this handle's queue, so at most one
/// transition per job is ever being applied. Once the job is retired the task
/// exits and every later request resolves to "unknown job" or "not found".
#[derive(Clone)]
pub struct JobHandle {
    id: JobId,
    sender: mpsc::Sender<JobMessage>,
}

impl JobHandle {
    pub fn spawn(record: JobRecord, inbox_capacity: usize, notifier: Arc<Notifier>) -> Self {
        let (sender, inbox) = mpsc::channel(inbox_capacity);
        let id = record.id().clone();
        Actor::spawn(inbox, record, notifier);
        Self { id, sender }
    }

    pub async fn transition(&self, target: JobState) -> Result<JobRecord> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(JobMessage::Transition {
                target,
                response: tx,
            })
            .await
            .map_err(|_| Error::UnknownJob(self.id.clone()))?;
        rx.await.map_err(|_| Error::UnknownJob(self.id.clone()))?
    }

    pub async fn snapshot(&self) -> Result<JobRecord> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(JobMessage::Snapshot { response: tx })
            .await
            .map_err(|_| Error::NotFound(self.id.clone()))?;
        rx.await.map_err(|_| Error::NotFound(self.id.clone()))
    }

    /// Ask the job to shut down. Only succeeds for terminal jobs.
    pub async fn retire(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(JobMessage::Retire { response: tx })
            .await
            .map_err(|_| Error::NotFound(self.id.clone()))?;
        rx.await.map_err(|_| Error::NotFound(self.id.clone()))?
    }
}
