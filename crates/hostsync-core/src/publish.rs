//! Configuration publisher
//!
//! Read-modify-write of the `hosts` field in the shared configuration
//! record:
//!
//! 1. Get the record. A missing record is an error; it is never created.
//! 2. Overwrite the `hosts` field, leaving every other field alone.
//! 3. Replace the record, submitting the revision observed in step 1.
//! 4. A stale revision surfaces as [`Error::Conflict`]. No retry.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::HOSTS_KEY;
use crate::error::{Error, Result};
use crate::traits::{ConfigStore, RecordId};

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Revision the record was read at
    pub previous_revision: Option<String>,
    /// Revision assigned by the store to the written record
    pub revision: Option<String>,
    /// Whether the `hosts` value differs from what was stored before
    pub changed: bool,
}

/// Publishes host directories into a [`ConfigStore`]
pub struct Publisher<'a> {
    store: &'a dyn ConfigStore,
    call_timeout: Duration,
}

impl<'a> Publisher<'a> {
    /// Create a publisher; each store call is bounded by `call_timeout`
    pub fn new(store: &'a dyn ConfigStore, call_timeout: Duration) -> Self {
        Self {
            store,
            call_timeout,
        }
    }

    /// Write `content` into the `hosts` field of the record `id`
    pub async fn publish(&self, id: &RecordId, content: &str) -> Result<PublishOutcome> {
        let mut record = self
            .bounded("get", self.store.get(id))
            .await?
            .ok_or_else(|| Error::record_not_found(id.to_string()))?;

        let previous_revision = record.revision.clone();
        let previous = record.set_field(HOSTS_KEY, content);
        let changed = previous.as_deref() != Some(content);

        debug!(
            record = %id,
            revision = ?previous_revision,
            changed,
            "Replacing configuration record"
        );

        let written = self.bounded("replace", self.store.replace(&record)).await?;

        info!(
            record = %id,
            store = self.store.store_name(),
            revision = ?written.revision,
            "Configuration record updated"
        );

        Ok(PublishOutcome {
            previous_revision,
            revision: written.revision,
            changed,
        })
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .map_err(|_| {
                Error::transport(format!(
                    "{} store {} timed out after {:?}",
                    self.store.store_name(),
                    operation,
                    self.call_timeout
                ))
            })?
    }
}
