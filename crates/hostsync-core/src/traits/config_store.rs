// # Configuration Store Trait
//
// Defines the interface for the shared, namespaced key-value record the
// host directory is published into.
//
// ## Concurrency
//
// Stores use optimistic concurrency: a record carries the revision it was
// read at, and `replace` must be rejected when the stored revision has
// moved on since. That check is the only protection between concurrent
// writers; there is no locking in this process.
//
// ## Implementations
//
// - Kubernetes ConfigMap: `hostsync-store-configmap` crate
// - In-memory: [`MemoryConfigStore`](crate::store::MemoryConfigStore)

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a configuration record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Namespace the record lives in
    pub namespace: String,
    /// Record name
    pub name: String,
}

impl RecordId {
    /// Create a new record identity
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A configuration record as read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord {
    /// Record identity
    pub id: RecordId,

    /// Revision marker observed at read time
    ///
    /// `replace` submits it back so the store can detect concurrent changes.
    pub revision: Option<String>,

    /// String key-value data of the record
    pub data: BTreeMap<String, String>,

    /// Store-native document this record was read from
    ///
    /// Never inspected by the pipeline. Stores use it to write back every
    /// field they do not map into `data`.
    pub source: serde_json::Value,
}

impl ConfigRecord {
    /// Create a record with no store-native document attached
    pub fn new(id: RecordId, revision: Option<String>, data: BTreeMap<String, String>) -> Self {
        Self {
            id,
            revision,
            data,
            source: serde_json::Value::Null,
        }
    }

    /// Set one data field, returning the previous value
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.to_string(), value.into())
    }

    /// Read one data field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Trait for configuration store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Contract
///
/// - Stores never create records. `replace` on a missing record fails with
///   [`Error::RecordNotFound`](crate::Error::RecordNotFound).
/// - `replace` with a stale revision fails with
///   [`Error::Conflict`](crate::Error::Conflict) and leaves the record untouched.
/// - No retry logic; the publisher decides what a failure means.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Get a record by identity
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ConfigRecord))`: The record and its current revision
    /// - `Ok(None)`: No such record
    /// - `Err(Error)`: Store error
    async fn get(&self, id: &RecordId) -> Result<Option<ConfigRecord>, crate::Error>;

    /// Replace a record, guarded by the revision it was read at
    ///
    /// # Returns
    ///
    /// - `Ok(ConfigRecord)`: The record as stored, with its new revision
    /// - `Err(Error)`: Conflict, missing record, or store error
    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
