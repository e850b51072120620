// # hostsync-core
//
// Core library for publishing an IPAM address inventory as a hosts file
// inside a shared cluster configuration record.
//
// ## Architecture Overview
//
// - **InventorySource**: Trait for retrieving the address inventory
// - **ConfigStore**: Trait for the shared, revisioned configuration record
// - **HostDirectory**: Deterministic inventory → hosts-file rendering
// - **Publisher**: Read-modify-write of the `hosts` field with optimistic concurrency
// - **SyncEngine**: One Fetch → Render → Publish pass per trigger
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from the IPAM and cluster clients
// 2. **Injected Collaborators**: The engine owns its source and store; no global client handles
// 3. **Single Pass**: No caching and no internal retry; every failure ends the pass
// 4. **Library-First**: The daemon is a thin HTTP trigger around this crate

pub mod traits;
pub mod directory;
pub mod publish;
pub mod engine;
pub mod config;
pub mod error;
pub mod store;

// Re-export core types for convenience
pub use traits::{AddressRecord, ConfigRecord, ConfigStore, Inventory, InventorySource, RecordId};
pub use directory::{HostDirectory, HostEntry, render_hosts};
pub use publish::{PublishOutcome, Publisher};
pub use engine::{SyncEngine, SyncReport};
pub use config::{InventoryConfig, PaginationMode, StoreConfig, SyncConfig, TargetConfig};
pub use error::{Error, Result};
pub use store::MemoryConfigStore;
