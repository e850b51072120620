// # Inventory Source Trait
//
// Defines the interface for retrieving the address inventory.
//
// ## Implementations
//
// - NetBox: `hostsync-inventory-netbox` crate
//
// ## Usage
//
// ```rust,ignore
// use hostsync_core::InventorySource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* InventorySource implementation */;
//
//     let inventory = source.fetch().await?;
//     if inventory.truncated {
//         // only part of the listing was consumed
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry of the external address inventory
///
/// The address is not validated. Entries have no identity beyond their
/// position in the listing, so duplicates are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// IP address, usually with a prefix length (e.g. "10.0.0.5/24")
    pub address: String,

    /// DNS name assigned to the address
    #[serde(default)]
    pub dns_name: Option<String>,

    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

impl AddressRecord {
    /// Create a record with all three fields set
    pub fn new(
        address: impl Into<String>,
        dns_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            dns_name: Some(dns_name.into()),
            description: Some(description.into()),
        }
    }
}

/// Result of a single inventory fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    /// Records in the order the source listed them
    pub records: Vec<AddressRecord>,

    /// True when the source advertised more results that were not consumed
    pub truncated: bool,
}

impl Inventory {
    /// Create a complete (non-truncated) inventory
    pub fn complete(records: Vec<AddressRecord>) -> Self {
        Self {
            records,
            truncated: false,
        }
    }
}

/// Trait for inventory source implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe: concurrent webhook calls share one
/// instance and may fetch at the same time.
///
/// # Contract
///
/// - One fetch per call. No retry and no caching between calls.
/// - The fetch must be bounded by a deadline; expiry is reported as
///   [`Error::Transport`](crate::Error::Transport).
/// - Failures map onto the error taxonomy:
///   [`RequestConstruction`](crate::Error::RequestConstruction),
///   [`Transport`](crate::Error::Transport),
///   [`UpstreamStatus`](crate::Error::UpstreamStatus),
///   [`Decode`](crate::Error::Decode).
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch the current inventory
    ///
    /// # Returns
    ///
    /// - `Ok(Inventory)`: Records in source order, plus the truncation flag
    /// - `Err(Error)`: The fetch failed; nothing was retrieved
    async fn fetch(&self) -> Result<Inventory, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
