//! Job lifecycle tracking for monitoring dashboards.
//!
//! Producers register jobs and drive them through `waiting → running →
//! success | failed | stopped`; observers read snapshots from the registry or
//! follow transitions live through the monitor feed.
mod actors;
pub mod catalog;
pub mod config;
pub mod error;
mod events;
pub mod lifecycle;
mod monitor;
pub mod record;
pub mod registry;
pub mod types;

pub use actors::feed::{MonitorFeedHandle as MonitorFeed, Subscription, SubscriptionId};
pub use catalog::{Locale, Severity, StatusCatalog, StatusDescriptor};
pub use config::Configuration;
pub use error::{Error, Result};
pub use events::{JobState, ParseStateError, TransitionEvent};
pub use lifecycle::{LifecycleEngine, TransitionHook};
pub use monitor::JobMonitor;
pub use record::{HistoryEntry, JobRecord};
pub use registry::{JobRegistry, ListFilter};
pub use types::JobId;
