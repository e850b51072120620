//! Core traits for the hostsync system
//!
//! This module defines the abstract interfaces for the two external collaborators.
//!
//! - [`InventorySource`]: Retrieve the address inventory from the IPAM system
//! - [`ConfigStore`]: Read and replace the shared configuration record

pub mod inventory_source;
pub mod config_store;

pub use inventory_source::{AddressRecord, Inventory, InventorySource};
pub use config_store::{ConfigRecord, ConfigStore, RecordId};
