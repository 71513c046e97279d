use crate::events::JobState;
use crate::types::{JobId, Timestamp};
use time::Duration;

/// One entry of a job's audit trail: the state entered and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub state: JobState,
    pub at: Timestamp,
}

/// Snapshot of a tracked job.
///
/// Records handed out by the registry are copies; the authoritative record lives
/// inside the job's actor and only the lifecycle engine advances it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRecord {
    id: JobId,
    state: JobState,
    created_at: Timestamp,
    updated_at: Timestamp,
    history: Vec<HistoryEntry>,
}

impl JobRecord {
    pub(crate) fn new(id: JobId, now: Timestamp) -> Self {
        Self {
            id,
            state: JobState::Waiting,
            created_at: now,
            updated_at: now,
            history: vec![HistoryEntry {
                state: JobState::Waiting,
                at: now,
            }],
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Every state the job has entered, oldest first. Never empty.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// How long the job has been in its current state.
    pub fn time_in_state(&self, now: Timestamp) -> Duration {
        now - self.updated_at
    }

    /// Dwell time of each history entry. The last entry is measured up to `now`.
    pub fn durations(&self, now: Timestamp) -> impl Iterator<Item = (JobState, Duration)> + '_ {
        let ends = self
            .history
            .iter()
            .skip(1)
            .map(|entry| entry.at)
            .chain(std::iter::once(now));
        self.history
            .iter()
            .zip(ends)
            .map(|(entry, end)| (entry.state, end - entry.at))
    }

    // history and state move together so the last entry always matches `state`
    pub(crate) fn advance(&mut self, state: JobState, at: Timestamp) {
        self.history.push(HistoryEntry { state, at });
        self.state = state;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn new_record_is_waiting() {
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let record = JobRecord::new("J1".into(), t0);
        assert_eq!(record.state(), JobState::Waiting);
        assert_eq!(record.created_at(), record.updated_at());
        assert_eq!(
            record.history(),
            &[HistoryEntry {
                state: JobState::Waiting,
                at: t0
            }]
        );
    }

    #[test]
    fn advance_keeps_history_in_step() {
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let t1 = datetime!(2024-01-01 0:01 UTC);
        let mut record = JobRecord::new("J1".into(), t0);
        record.advance(JobState::Running, t1);
        assert_eq!(record.state(), JobState::Running);
        assert_eq!(record.updated_at(), t1);
        assert_eq!(record.created_at(), t0);
        assert_eq!(record.history().last().map(|e| e.state), Some(record.state()));
        assert_eq!(record.history().len(), 2);
    }

    #[test]
    fn durations_per_state() {
        let t0 = datetime!(2024-01-01 0:00 UTC);
        let t1 = datetime!(2024-01-01 0:01 UTC);
        let t2 = datetime!(2024-01-01 0:05 UTC);
        let mut record = JobRecord::new("J1".into(), t0);
        record.advance(JobState::Running, t1);

        let durations: Vec<_> = record.durations(t2).collect();
        assert_eq!(
            durations,
            vec![
                (JobState::Waiting, Duration::minutes(1)),
                (JobState::Running, Duration::minutes(4)),
            ]
        );
        assert_eq!(record.time_in_state(t2), Duration::minutes(4));
    }
}
