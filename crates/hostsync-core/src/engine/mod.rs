//! Core sync engine
//!
//! The SyncEngine runs one synchronization pass per call:
//! - Fetching the address inventory via InventorySource
//! - Rendering it into a host directory
//! - Publishing the directory into the configuration record via ConfigStore
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐   Inventory   ┌────────────────┐   String   ┌──────────────┐
//! │ InventorySource│ ────────────▶ │ HostDirectory  │ ─────────▶ │  Publisher   │
//! │   (fetch)      │               │   (render)     │            │ (get/replace)│
//! └────────────────┘               └────────────────┘            └──────────────┘
//!                                                                        │
//!                                                                        ▼
//!                                                                ┌──────────────┐
//!                                                                │ ConfigStore  │
//!                                                                └──────────────┘
//! ```
//!
//! ## Concurrency
//!
//! The engine holds no mutable state, so one instance is shared by every
//! concurrent webhook call. Concurrent passes race on the configuration
//! record; the store's revision check decides the loser, which gets
//! [`Error::Conflict`](crate::Error::Conflict).

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::directory::HostDirectory;
use crate::error::Result;
use crate::publish::{PublishOutcome, Publisher};
use crate::traits::{ConfigStore, InventorySource, RecordId};

/// Summary of a completed sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of host entries published
    pub entries: usize,
    /// Whether the inventory source reported unconsumed results
    pub truncated: bool,
    /// Publish result
    pub outcome: PublishOutcome,
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run_once()`] per trigger
///
/// Nothing is held across calls besides the two collaborators.
pub struct SyncEngine {
    /// Inventory source for fetching addresses
    inventory: Box<dyn InventorySource>,

    /// Store holding the configuration record
    store: Box<dyn ConfigStore>,

    /// Record the directory is published into
    target: RecordId,

    /// Deadline for each store call
    store_timeout: Duration,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `inventory`: Inventory source implementation
    /// - `store`: Configuration store implementation
    /// - `config`: Sync configuration (validated here)
    pub fn new(
        inventory: Box<dyn InventorySource>,
        store: Box<dyn ConfigStore>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inventory,
            store,
            target: config.target.record_id(),
            store_timeout: config.store.call_timeout(),
        })
    }

    /// Record this engine publishes into
    pub fn target(&self) -> &RecordId {
        &self.target
    }

    /// Run one Fetch → Render → Publish pass
    ///
    /// The store is not contacted when the fetch fails. Every error is
    /// terminal for this pass.
    pub async fn run_once(&self) -> Result<SyncReport> {
        let inventory = self.inventory.fetch().await?;
        debug!(
            source = self.inventory.source_name(),
            records = inventory.records.len(),
            "Inventory fetched"
        );

        if inventory.truncated {
            warn!(
                source = self.inventory.source_name(),
                records = inventory.records.len(),
                "Inventory listing has more results than were consumed; the published directory is incomplete"
            );
        }

        let directory = HostDirectory::from_records(&inventory.records);
        let content = directory.render();

        let outcome = Publisher::new(self.store.as_ref(), self.store_timeout)
            .publish(&self.target, &content)
            .await?;

        info!(
            record = %self.target,
            entries = directory.len(),
            changed = outcome.changed,
            "Host directory published"
        );

        Ok(SyncReport {
            entries: directory.len(),
            truncated: inventory.truncated,
            outcome,
        })
    }
}
