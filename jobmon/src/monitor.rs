use crate::actors::feed::{MonitorFeedHandle, Subscription};
use crate::config::Configuration;
use crate::error::Result;
use crate::events::JobState;
use crate::lifecycle::{LifecycleEngine, Notifier, TransitionHook};
use crate::record::JobRecord;
use crate::registry::{JobRegistry, ListFilter};
use crate::types::JobId;
use futures::Stream;
use std::sync::Arc;

/// The monitoring core wired together: registry, lifecycle engine and feed.
///
/// Cloning is cheap and every clone drives the same jobs. The spawned tasks wind
/// down once the last clone is dropped.
#[derive(Clone)]
pub struct JobMonitor {
    registry: JobRegistry,
    engine: LifecycleEngine,
    feed: MonitorFeedHandle,
}

impl JobMonitor {
    pub fn spawn(config: &Configuration) -> Self {
        Self::build(config, None)
    }

    /// Like [`JobMonitor::spawn`], also handing every committed transition to `hook`.
    pub fn spawn_with_hook<H: TransitionHook>(config: &Configuration, hook: H) -> Self {
        Self::build(config, Some(Arc::new(hook)))
    }

    fn build(config: &Configuration, hook: Option<Arc<dyn TransitionHook>>) -> Self {
        let feed = MonitorFeedHandle::spawn(config.feed_buffer.get());
        let notifier = Arc::new(Notifier::new(feed.clone(), hook));
        let registry = JobRegistry::new(notifier, config.job_inbox.get());
        let engine = LifecycleEngine::new(registry.clone());
        Self {
            registry,
            engine,
            feed,
        }
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    pub fn feed(&self) -> &MonitorFeedHandle {
        &self.feed
    }

    pub async fn create(&self, id: impl Into<JobId>) -> Result<JobRecord> {
        self.registry.create(id.into()).await
    }

    pub async fn transition(&self, id: &JobId, target: JobState) -> Result<JobRecord> {
        self.engine.transition(id, target).await
    }

    pub async fn get(&self, id: &JobId) -> Result<JobRecord> {
        self.registry.get(id).await
    }

    pub async fn list(&self, filter: ListFilter) -> impl Stream<Item = JobRecord> + Send + 'static {
        self.registry.list(filter).await
    }

    pub async fn remove(&self, id: &JobId) -> Result<()> {
        self.registry.remove(id).await
    }

    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }
}
