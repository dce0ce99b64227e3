use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::observability::{
    STORE_LOADS_TOTAL, STORE_LOAD_FALLBACKS_TOTAL, STORE_SAVES_TOTAL, STORE_SAVE_FAILURES_TOTAL,
};
use crate::storage::data_type::DataType;
use crate::storage::document_store::{DocumentStore, LoadOutcome};

/// Deepest array/object nesting `serde_json` will parse back (its recursion limit is 128).
pub const MAX_NESTING_DEPTH: usize = 127;

/// Container nesting of a value; scalars are 0. Stops counting past `limit`.
fn nesting_depth(value: &Value, limit: usize) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((v, depth)) = stack.pop() {
        let depth = depth + 1;
        match v {
            Value::Array(items) => stack.extend(items.iter().map(|child| (child, depth))),
            Value::Object(map) => stack.extend(map.values().map(|child| (child, depth))),
            _ => continue,
        }
        deepest = deepest.max(depth);
        if deepest > limit {
            break;
        }
    }
    deepest
}

/// JSON file-backed collection store: one `<data_type>.json` per registered type.
///
/// Nothing is cached in memory; every call goes to disk, so several processes
/// may share a data directory. Writes land in a temporary sibling first and
/// are renamed over the backing file, so readers always see a complete
/// document. Concurrent writers to the same type are not serialized: the last
/// rename wins.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Point the store at a data directory. Nothing is created until the first save.
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Arc<Self> {
        Arc::new(Self { data_dir: data_dir.into() })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Backing file for a data type.
    pub fn path_for(&self, data_type: DataType) -> PathBuf {
        self.data_dir.join(data_type.file_name())
    }

    async fn resolve(&self, data_type: DataType) -> Value {
        STORE_LOADS_TOTAL.with_label_values(&[data_type.as_str()]).inc();
        let outcome = self.load(data_type).await;
        match &outcome {
            LoadOutcome::Corrupt(err) => {
                STORE_LOAD_FALLBACKS_TOTAL.with_label_values(&[data_type.as_str()]).inc();
                warn!(
                    %data_type,
                    path = %self.path_for(data_type).display(),
                    error = %err,
                    "collection unreadable, serving default"
                );
            }
            LoadOutcome::Absent => debug!(%data_type, "no backing file yet, serving default"),
            LoadOutcome::Stored(_) => {}
        }
        outcome.into_value(data_type)
    }

    async fn write_replacing(&self, data_type: DataType, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir).await?;
        let target = self.path_for(data_type);
        let tmp = self
            .data_dir
            .join(format!(".{}.{}.tmp", data_type.file_name(), Uuid::new_v4().simple()));

        let written = match fs::write(&tmp, bytes).await {
            Ok(()) => fs::rename(&tmp, &target).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = fs::remove_file(&tmp).await;
        }
        written
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load(&self, data_type: DataType) -> LoadOutcome {
        match fs::read(self.path_for(data_type)).await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => LoadOutcome::Stored(value),
                Err(e) => LoadOutcome::Corrupt(ServiceError::load(data_type.as_str(), e)),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => LoadOutcome::Absent,
            Err(e) => LoadOutcome::Corrupt(ServiceError::load(data_type.as_str(), e)),
        }
    }

    async fn get(&self, data_type: &str) -> Result<Value, ServiceError> {
        let data_type: DataType = data_type.parse()?;
        Ok(self.resolve(data_type).await)
    }

    async fn get_all(&self) -> Result<Map<String, Value>, ServiceError> {
        let mut all = Map::new();
        for data_type in DataType::ALL {
            all.insert(data_type.as_str().to_string(), self.resolve(data_type).await);
        }
        Ok(all)
    }

    async fn put(&self, data_type: &str, value: &Value) -> Result<(), ServiceError> {
        let data_type: DataType = data_type.parse()?;
        let label = [data_type.as_str()];

        // anything deeper would be written fine but read back as corrupt
        let depth = nesting_depth(value, MAX_NESTING_DEPTH);
        if depth > MAX_NESTING_DEPTH {
            STORE_SAVE_FAILURES_TOTAL.with_label_values(&label).inc();
            warn!(%data_type, depth, "collection nested too deeply, not saved");
            return Err(ServiceError::save(
                data_type.as_str(),
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }

        // Two-space indentation, UTF-8 kept literal.
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| {
            STORE_SAVE_FAILURES_TOTAL.with_label_values(&label).inc();
            ServiceError::save(data_type.as_str(), e)
        })?;

        if let Err(e) = self.write_replacing(data_type, &bytes).await {
            STORE_SAVE_FAILURES_TOTAL.with_label_values(&label).inc();
            warn!(%data_type, path = %self.path_for(data_type).display(), error = %e, "failed to save collection");
            return Err(ServiceError::save(data_type.as_str(), e));
        }

        STORE_SAVES_TOTAL.with_label_values(&label).inc();
        info!(%data_type, path = %self.path_for(data_type).display(), bytes = bytes.len(), "collection saved");
        Ok(())
    }
}
