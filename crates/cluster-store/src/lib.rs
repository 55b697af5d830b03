//! Cluster store abstraction
//!
//! Versioned get/create/update over workload objects. The concrete transport
//! (Kubernetes API server, etcd, test double) lives behind the
//! [`ClusterStore`] trait; write safety is delegated entirely to the store's
//! version-token check, so callers need no in-process locking.

pub mod error;
pub mod store;

#[cfg(feature = "test-util")]
pub mod memory;

pub use error::StoreError;
pub use store::{ClusterStore, StoredObject};

#[cfg(feature = "test-util")]
pub use memory::MemoryStore;
