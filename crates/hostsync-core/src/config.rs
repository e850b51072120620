//! Configuration types for the hostsync system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::traits::RecordId;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "kube-system";

/// Configuration record name used when none is configured
pub const DEFAULT_CONFIGMAP: &str = "netbox-hosts";

/// Key inside the configuration record that holds the rendered directory
pub const HOSTS_KEY: &str = "hosts";

/// Main sync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Inventory source configuration
    pub inventory: InventoryConfig,

    /// Configuration record the directory is published into
    #[serde(default)]
    pub target: TargetConfig,

    /// Configuration store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl SyncConfig {
    /// Create a configuration for the given inventory endpoint, with defaults elsewhere
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            inventory: InventoryConfig {
                base_url: base_url.into(),
                api_token: api_token.into(),
                ..InventoryConfig::default()
            },
            target: TargetConfig::default(),
            store: StoreConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.inventory.validate()?;
        self.target.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

/// Inventory source configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Base URL of the IPAM service (e.g. "https://netbox.example.com")
    pub base_url: String,

    /// API token sent as `Authorization: Token <token>`
    pub api_token: String,

    /// Whether continuation links in the inventory listing are followed
    #[serde(default)]
    pub pagination: PaginationMode,

    /// Deadline for the whole inventory fetch (in seconds)
    #[serde(default = "default_inventory_timeout_secs")]
    pub timeout_secs: u64,
}

impl InventoryConfig {
    /// Validate the inventory configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("Inventory base URL cannot be empty"));
        }
        if self.api_token.is_empty() {
            return Err(crate::Error::config("Inventory API token cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Inventory timeout must be > 0"));
        }
        Ok(())
    }

    /// Fetch deadline as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            pagination: PaginationMode::default(),
            timeout_secs: default_inventory_timeout_secs(),
        }
    }
}

// The token must never end up in logs.
impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("pagination", &self.pagination)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// How the inventory listing's continuation marker is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationMode {
    /// Consume only the first page; a `next` link marks the result as truncated
    #[default]
    FirstPage,
    /// Follow `next` links until the listing is exhausted
    Follow,
}

impl std::str::FromStr for PaginationMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-page" | "first_page" => Ok(PaginationMode::FirstPage),
            "follow" => Ok(PaginationMode::Follow),
            other => Err(crate::Error::config(format!(
                "Unknown pagination mode '{}'. Valid modes: first-page, follow",
                other
            ))),
        }
    }
}

/// Identity of the configuration record to publish into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Namespace of the record
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Name of the record
    #[serde(default = "default_configmap")]
    pub name: String,
}

impl TargetConfig {
    /// Build a target, falling back to the documented defaults for missing or empty parts
    pub fn with_fallback(namespace: Option<String>, name: Option<String>) -> Self {
        Self {
            namespace: namespace
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_namespace),
            name: name.filter(|s| !s.is_empty()).unwrap_or_else(default_configmap),
        }
    }

    /// Validate the target configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.namespace.is_empty() {
            return Err(crate::Error::config("Target namespace cannot be empty"));
        }
        if self.name.is_empty() {
            return Err(crate::Error::config("Target record name cannot be empty"));
        }
        Ok(())
    }

    /// Record identity for store calls
    pub fn record_id(&self) -> RecordId {
        RecordId::new(&self.namespace, &self.name)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            name: default_configmap(),
        }
    }
}

/// Configuration store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Deadline for each individual store call (in seconds)
    #[serde(default = "default_store_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.call_timeout_secs == 0 {
            return Err(crate::Error::config("Store call timeout must be > 0"));
        }
        Ok(())
    }

    /// Per-call deadline as a [`Duration`]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_store_timeout_secs(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_configmap() -> String {
    DEFAULT_CONFIGMAP.to_string()
}

fn default_inventory_timeout_secs() -> u64 {
    30
}

fn default_store_timeout_secs() -> u64 {
    10
}
