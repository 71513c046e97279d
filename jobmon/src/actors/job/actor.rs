use super::messages::JobMessage;
use crate::error::{self, Error};
use crate::events::JobState;
use crate::lifecycle::{self, Notifier};
use crate::record::JobRecord;
use crate::types;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub struct Actor {
    inbox: mpsc::Receiver<JobMessage>,
    record: JobRecord,
    notifier: Arc<Notifier>,
}

impl Actor {
    pub fn spawn(inbox: mpsc::Receiver<JobMessage>, record: JobRecord, notifier: Arc<Notifier>) {
        let actor = Self {
            inbox,
            record,
            notifier,
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use JobMessage::*;
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Transition { target, response } => {
                    let _ = response.send(self.transition(target));
                }
                Snapshot { response } => {
                    let _ = response.send(self.record.clone());
                }
                Retire { response } => {
                    if self.record.is_terminal() {
                        debug!(job_id = %self.record.id(), "job retired");
                        let _ = response.send(Ok(()));
                        // dropping the inbox fails every request still queued
                        return;
                    }
                    let _ = response.send(Err(Error::RemovalDenied {
                        job_id: self.record.id().clone(),
                        state: self.record.state(),
                    }));
                }
            }
        }
    }

    fn transition(&mut self, target: JobState) -> error::Result<JobRecord> {
        let event = lifecycle::apply(&mut self.record, target, types::now())?;
        info!(
            job_id = %event.job_id,
            from = %event.from,
            to = %event.to,
            "job transitioned"
        );
        self.notifier.notify(&event);
        Ok(self.record.clone())
    }
}
