// # Configuration Store Implementations
//
// This module provides the in-process implementation of the ConfigStore
// trait. The Kubernetes-backed store lives in its own crate.

pub mod memory;

pub use memory::MemoryConfigStore;
