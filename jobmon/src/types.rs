use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub type Timestamp = time::OffsetDateTime;

/// Opaque job identifier, chosen by the producer or generated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(Arc<str>);

impl JobId {
    /// Generate a fresh random id for producers without a natural key.
    pub fn generate() -> Self {
        Uuid::new_v4().into()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string().into())
    }
}

pub(crate) fn now() -> Timestamp {
    Timestamp::now_utc()
}
