use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::storage::data_type::DataType;

/// Result of probing one backing file.
///
/// Keeps "absent" and "corrupt" apart so callers can log the difference
/// before collapsing both into the registry default.
#[derive(Debug)]
pub enum LoadOutcome {
    Stored(Value),
    Absent,
    Corrupt(ServiceError),
}

impl LoadOutcome {
    pub fn into_value(self, data_type: DataType) -> Value {
        match self {
            LoadOutcome::Stored(v) => v,
            LoadOutcome::Absent | LoadOutcome::Corrupt(_) => data_type.default_value(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt(_))
    }
}

/// Trait abstraction for collection storage keyed by data type.
/// Implementations can be file-backed, database-backed, or remote KV.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a registered collection without applying the default policy.
    async fn load(&self, data_type: DataType) -> LoadOutcome;

    /// Fetch one collection; unreadable collections resolve to their default.
    async fn get(&self, data_type: &str) -> Result<Value, ServiceError>;

    /// Fetch every registered collection, each resolved independently.
    async fn get_all(&self) -> Result<Map<String, Value>, ServiceError>;

    /// Replace one collection wholesale.
    async fn put(&self, data_type: &str, value: &Value) -> Result<(), ServiceError>;
}
