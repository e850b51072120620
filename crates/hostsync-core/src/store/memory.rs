// # Memory Configuration Store
//
// In-memory implementation of ConfigStore.
//
// ## Purpose
//
// Behaves like a real optimistic-concurrency store without any cluster:
// every successful replace bumps a numeric revision, and a replace that
// carries an older revision is rejected. Used by tests and by embedders
// that want to run the pipeline against a local record.
//
// ## Crash Behavior
//
// - All records are lost on restart
// - Records must be seeded with `insert`; the store never creates them on replace

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::traits::config_store::{ConfigRecord, ConfigStore, RecordId};
use crate::Error;

#[derive(Debug, Clone)]
struct StoredRecord {
    revision: u64,
    data: BTreeMap<String, String>,
    source: serde_json::Value,
}

/// In-memory configuration store
///
/// Records are kept in a HashMap protected by a RwLock. Revisions are
/// decimal strings of a per-store counter.
///
/// # Example
///
/// ```rust,no_run
/// use hostsync_core::store::MemoryConfigStore;
/// use hostsync_core::traits::{ConfigStore, RecordId};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryConfigStore::new();
///     let id = RecordId::new("kube-system", "netbox-hosts");
///     store.insert(id.clone(), [("hosts".to_string(), String::new())].into()).await;
///
///     let mut record = store.get(&id).await?.expect("seeded");
///     record.set_field("hosts", "10.0.0.1 gw.lan # gateway");
///     store.replace(&record).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    inner: Arc<RwLock<HashMap<RecordId, StoredRecord>>>,
    next_revision: Arc<std::sync::atomic::AtomicU64>,
}

impl MemoryConfigStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or overwrite) a record, returning its new revision
    pub async fn insert(&self, id: RecordId, data: BTreeMap<String, String>) -> String {
        self.insert_with_source(id, data, serde_json::Value::Null).await
    }

    /// Seed a record together with an opaque store-native document
    pub async fn insert_with_source(
        &self,
        id: RecordId,
        data: BTreeMap<String, String>,
        source: serde_json::Value,
    ) -> String {
        let revision = self.bump();
        let mut guard = self.inner.write().await;
        guard.insert(
            id,
            StoredRecord {
                revision,
                data,
                source,
            },
        );
        revision.to_string()
    }

    /// Remove a record
    pub async fn remove(&self, id: &RecordId) {
        self.inner.write().await.remove(id);
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    fn bump(&self) -> u64 {
        self.next_revision
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1
    }
}

fn to_record(id: &RecordId, stored: &StoredRecord) -> ConfigRecord {
    ConfigRecord {
        id: id.clone(),
        revision: Some(stored.revision.to_string()),
        data: stored.data.clone(),
        source: stored.source.clone(),
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, id: &RecordId) -> Result<Option<ConfigRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(id).map(|stored| to_record(id, stored)))
    }

    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord, Error> {
        let mut guard = self.inner.write().await;
        let stored = guard
            .get_mut(&record.id)
            .ok_or_else(|| Error::record_not_found(record.id.to_string()))?;

        let current = stored.revision.to_string();
        if let Some(ref submitted) = record.revision
            && *submitted != current
        {
            return Err(Error::conflict(format!(
                "{} was modified concurrently (submitted revision {}, current {})",
                record.id, submitted, current
            )));
        }

        stored.revision = self.bump();
        stored.data = record.data.clone();
        stored.source = record.source.clone();

        Ok(to_record(&record.id, stored))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
