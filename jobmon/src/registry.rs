use crate::actors::job::JobHandle;
use crate::error::{Error, Result};
use crate::events::JobState;
use crate::lifecycle::Notifier;
use crate::record::JobRecord;
use crate::types::{self, JobId};
use futures::{stream, Stream, StreamExt};
use std::collections::{btree_map::Entry, BTreeMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Selects which records [`JobRegistry::list`] yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub state: Option<JobState>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn state(state: JobState) -> Self {
        Self { state: Some(state) }
    }

    pub fn matches(&self, record: &JobRecord) -> bool {
        self.state.map_or(true, |state| record.state() == state)
    }
}

/// The set of tracked jobs.
///
/// The map only holds handles to per-job tasks, and its lock is held just long
/// enough to look up, insert, remove or copy handles. Reading or advancing a
/// record happens on the job's own task.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<BTreeMap<JobId, JobHandle>>>,
    notifier: Arc<Notifier>,
    inbox_capacity: usize,
}

impl JobRegistry {
    pub(crate) fn new(notifier: Arc<Notifier>, inbox_capacity: usize) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(BTreeMap::new())),
            notifier,
            inbox_capacity: inbox_capacity.max(1),
        }
    }

    /// Start tracking a new job in the `waiting` state.
    pub async fn create(&self, id: JobId) -> Result<JobRecord> {
        let mut jobs = self.jobs.write().await;
        match jobs.entry(id) {
            Entry::Occupied(entry) => Err(Error::DuplicateJob(entry.key().clone())),
            Entry::Vacant(entry) => {
                let record = JobRecord::new(entry.key().clone(), types::now());
                let handle =
                    JobHandle::spawn(record.clone(), self.inbox_capacity, self.notifier.clone());
                entry.insert(handle);
                debug!(job_id = %record.id(), "job created");
                Ok(record)
            }
        }
    }

    pub async fn get(&self, id: &JobId) -> Result<JobRecord> {
        self.handle(id)
            .await
            .ok_or_else(|| Error::NotFound(id.clone()))?
            .snapshot()
            .await
    }

    /// Lazily yield the records matching `filter`, ordered by id.
    ///
    /// The set of jobs is fixed when this is called; each record is read when
    /// the stream reaches it. Jobs removed in between are skipped.
    pub async fn list(&self, filter: ListFilter) -> impl Stream<Item = JobRecord> + Send + 'static {
        let handles: Vec<JobHandle> = self.jobs.read().await.values().cloned().collect();
        stream::iter(handles).filter_map(move |job| async move {
            job.snapshot()
                .await
                .ok()
                .filter(|record| filter.matches(record))
        })
    }

    /// Stop tracking a job. Only terminal jobs can be removed.
    ///
    /// The map stays write-locked from lookup until the entry is gone, so no
    /// caller can see a retired job still registered.
    pub async fn remove(&self, id: &JobId) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        job.retire().await?;
        jobs.remove(id);
        debug!(job_id = %id, "job removed");
        Ok(())
    }

    /// Remove terminal jobs whose last transition is at least `ttl` old.
    /// Returns how many were removed.
    pub async fn evict_terminal(&self, ttl: Duration) -> usize {
        let ttl = time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX);
        let now = types::now();
        let expired: Vec<JobId> = self
            .list(ListFilter::all())
            .await
            .filter(|record| {
                let expired = record.is_terminal() && record.time_in_state(now) >= ttl;
                async move { expired }
            })
            .map(|record| record.id().clone())
            .collect()
            .await;

        let mut evicted = 0;
        for id in expired {
            if self.remove(&id).await.is_ok() {
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, "evicted expired terminal jobs");
        }
        evicted
    }

    pub async fn contains(&self, id: &JobId) -> bool {
        self.jobs.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    pub(crate) async fn handle(&self, id: &JobId) -> Option<JobHandle> {
        self.jobs.read().await.get(id).cloned()
    }
}
