//! The transition table and the engine that enforces it.
use crate::actors::feed::MonitorFeedHandle;
use crate::error::{Error, Result};
use crate::events::{JobState, TransitionEvent};
use crate::record::JobRecord;
use crate::registry::JobRegistry;
use crate::types::{JobId, Timestamp};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// States reachable in one step from `from`. Terminal states yield an empty slice.
pub const fn allowed_targets(from: JobState) -> &'static [JobState] {
    use JobState::*;
    match from {
        Waiting => &[Running, Stopped],
        Running => &[Success, Failed, Stopped],
        Success | Failed | Stopped => &[],
    }
}

pub fn is_legal(from: JobState, to: JobState) -> bool {
    allowed_targets(from).contains(&to)
}

/// Integration point for durability: called once per committed transition,
/// on the job's own task, before `transition` returns to its caller.
pub trait TransitionHook: Send + Sync + 'static {
    fn on_transition(&self, event: &TransitionEvent);
}

impl<F> TransitionHook for F
where
    F: Fn(&TransitionEvent) + Send + Sync + 'static,
{
    fn on_transition(&self, event: &TransitionEvent) {
        self(event)
    }
}

/// Where committed transitions go: the monitor feed, then the hook if any.
pub(crate) struct Notifier {
    feed: MonitorFeedHandle,
    hook: Option<Arc<dyn TransitionHook>>,
}

impl Notifier {
    pub(crate) fn new(feed: MonitorFeedHandle, hook: Option<Arc<dyn TransitionHook>>) -> Self {
        Self { feed, hook }
    }

    pub(crate) fn notify(&self, event: &TransitionEvent) {
        self.feed.publish(event.clone());
        if let Some(hook) = &self.hook {
            // the transition is already committed, a failing hook must not take the job down
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| hook.on_transition(event)));
            if outcome.is_err() {
                warn!(
                    job_id = %event.job_id,
                    from = %event.from,
                    to = %event.to,
                    "transition hook panicked"
                );
            }
        }
    }
}

/// Check `target` against the table and, only if legal, advance `record`.
///
/// On error the record is untouched.
pub(crate) fn apply(
    record: &mut JobRecord,
    target: JobState,
    at: Timestamp,
) -> Result<TransitionEvent> {
    let from = record.state();
    if !is_legal(from, target) {
        return Err(Error::IllegalTransition { from, to: target });
    }
    record.advance(target, at);
    Ok(TransitionEvent {
        job_id: record.id().clone(),
        from,
        to: target,
        at,
    })
}

/// Sole entry point for state changes.
///
/// The engine routes each request to the job's own actor, so requests for one
/// job are applied one at a time while different jobs never wait on each other.
#[derive(Clone)]
pub struct LifecycleEngine {
    registry: JobRegistry,
}

impl LifecycleEngine {
    pub fn new(registry: JobRegistry) -> Self {
        Self { registry }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn transition(&self, job_id: &JobId, target: JobState) -> Result<JobRecord> {
        let job = self
            .registry
            .handle(job_id)
            .await
            .ok_or_else(|| Error::UnknownJob(job_id.clone()))?;
        job.transition(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn table() {
        use JobState::*;
        let legal: Vec<_> = JobState::ALL
            .into_iter()
            .flat_map(|from| JobState::ALL.into_iter().map(move |to| (from, to)))
            .filter(|(from, to)| is_legal(*from, *to))
            .collect();
        assert_eq!(
            legal,
            vec![
                (Waiting, Running),
                (Waiting, Stopped),
                (Running, Success),
                (Running, Failed),
                (Running, Stopped),
            ]
        );
        for state in JobState::ALL {
            assert_eq!(state.is_terminal(), allowed_targets(state).is_empty());
        }
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let t1 = datetime!(2024-01-01 0:01 UTC);
        for from in JobState::ALL {
            for to in JobState::ALL {
                let mut record = JobRecord::new("J1".into(), t0);
                let path = match from {
                    JobState::Waiting => vec![],
                    JobState::Running | JobState::Stopped => vec![from],
                    terminal => vec![JobState::Running, terminal],
                };
                for state in path {
                    record.advance(state, t0);
                }
                let before = record.clone();

                match apply(&mut record, to, t1) {
                    Ok(event) => {
                        assert!(is_legal(from, to));
                        assert_eq!((event.from, event.to, event.at), (from, to, t1));
                        assert_eq!(record.state(), to);
                        assert_eq!(record.history().len(), before.history().len() + 1);
                    }
                    Err(err) => {
                        assert!(!is_legal(from, to));
                        assert_eq!(err, Error::IllegalTransition { from, to });
                        assert_eq!(record, before);
                    }
                }
            }
        }
    }
}
