//! Test doubles and common utilities for contract tests
//!
//! Minimal inventory sources and store wrappers that record how the
//! pipeline talks to its collaborators.

#![allow(dead_code)]

use hostsync_core::error::{Error, Result};
use hostsync_core::traits::{
    AddressRecord, ConfigRecord, ConfigStore, Inventory, InventorySource, RecordId,
};
use hostsync_core::{MemoryConfigStore, SyncConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Target used by every contract test
pub fn target() -> RecordId {
    RecordId::new("kube-system", "netbox-hosts")
}

/// Config pointing at the default target
pub fn minimal_config() -> SyncConfig {
    SyncConfig::new("https://netbox.test", "test-token")
}

/// The two-host inventory used across tests
pub fn two_hosts() -> Vec<AddressRecord> {
    vec![
        AddressRecord::new("192.168.1.1", "example.com", "Test host"),
        AddressRecord::new("192.168.1.2", "example2.com", "Test host 2"),
    ]
}

/// Seed the default target with some unrelated keys
pub async fn seeded_store() -> MemoryConfigStore {
    let store = MemoryConfigStore::new();
    let data: BTreeMap<String, String> = [
        ("hosts".to_string(), "old".to_string()),
        ("Corefile".to_string(), ".:53 { hosts /etc/hosts }".to_string()),
    ]
    .into();
    store.insert(target(), data).await;
    store
}

/// An inventory source returning a fixed inventory
pub struct StaticInventory {
    inventory: Inventory,
    fetch_call_count: Arc<AtomicUsize>,
}

impl StaticInventory {
    pub fn new(records: Vec<AddressRecord>) -> Self {
        Self::with_inventory(Inventory::complete(records))
    }

    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            inventory,
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InventorySource for StaticInventory {
    async fn fetch(&self) -> Result<Inventory> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.inventory.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// An inventory source that always fails with an upstream status
pub struct UnavailableInventory;

#[async_trait::async_trait]
impl InventorySource for UnavailableInventory {
    async fn fetch(&self) -> Result<Inventory> {
        Err(Error::upstream_status("503 Service Unavailable"))
    }

    fn source_name(&self) -> &'static str {
        "unavailable"
    }
}

/// A store wrapper that counts calls
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryConfigStore,
    get_call_count: Arc<AtomicUsize>,
    replace_call_count: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new(inner: MemoryConfigStore) -> Self {
        Self {
            inner,
            get_call_count: Arc::new(AtomicUsize::new(0)),
            replace_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn replace_call_count(&self) -> usize {
        self.replace_call_count.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryConfigStore {
        &self.inner
    }
}

#[async_trait::async_trait]
impl ConfigStore for CountingStore {
    async fn get(&self, id: &RecordId) -> Result<Option<ConfigRecord>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }

    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord> {
        self.replace_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(record).await
    }

    fn store_name(&self) -> &'static str {
        "counting"
    }
}

/// A store where another writer slips in between our read and our write
pub struct RacingStore {
    inner: MemoryConfigStore,
    competing_content: String,
}

impl RacingStore {
    pub fn new(inner: MemoryConfigStore, competing_content: impl Into<String>) -> Self {
        Self {
            inner,
            competing_content: competing_content.into(),
        }
    }
}

#[async_trait::async_trait]
impl ConfigStore for RacingStore {
    async fn get(&self, id: &RecordId) -> Result<Option<ConfigRecord>> {
        self.inner.get(id).await
    }

    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord> {
        let mut competitor = self
            .inner
            .get(&record.id)
            .await?
            .expect("record exists");
        competitor.set_field("hosts", self.competing_content.clone());
        self.inner.replace(&competitor).await?;

        self.inner.replace(record).await
    }

    fn store_name(&self) -> &'static str {
        "racing"
    }
}

/// A store whose calls never finish in time
pub struct StalledStore;

#[async_trait::async_trait]
impl ConfigStore for StalledStore {
    async fn get(&self, _id: &RecordId) -> Result<Option<ConfigRecord>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn replace(&self, record: &ConfigRecord) -> Result<ConfigRecord> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(record.clone())
    }

    fn store_name(&self) -> &'static str {
        "stalled"
    }
}
