use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Events each subscriber may buffer before the oldest is dropped.
    #[serde(default = "default_feed_buffer")]
    pub feed_buffer: NonZeroUsize,
    /// Requests queued per job before producers wait.
    #[serde(default = "default_job_inbox")]
    pub job_inbox: NonZeroUsize,
    /// Terminal jobs are kept forever unless this is set.
    #[serde(default)]
    pub retention: Option<RetentionConfiguration>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            feed_buffer: default_feed_buffer(),
            job_inbox: default_job_inbox(),
            retention: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RetentionConfiguration {
    pub terminal_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl RetentionConfiguration {
    pub fn terminal_ttl(&self) -> Duration {
        Duration::from_secs(self.terminal_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_feed_buffer() -> NonZeroUsize {
    NonZeroUsize::new(256).unwrap_or(NonZeroUsize::MIN)
}

fn default_job_inbox() -> NonZeroUsize {
    NonZeroUsize::new(32).unwrap_or(NonZeroUsize::MIN)
}

fn default_sweep_interval_secs() -> u64 {
    60
}
