//! ClusterStore trait
//!
//! This trait abstracts the cluster store so the reconcile engine can be
//! exercised against a mock in unit tests. All methods must be `Send` to work
//! with Tokio's work-stealing runtime.

use crate::error::StoreError;
use resources::{Identity, VersionToken, WorkloadObject};

/// A workload object together with the version token it was read or written
/// at. The token must be passed back on update for the optimistic-concurrency
/// check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// The object as known to the store
    pub object: WorkloadObject,

    /// Version token at the time of the read or write
    pub version: VersionToken,
}

/// Trait for cluster store operations
///
/// The store's version-token check is the only write-safety mechanism: a
/// connection may be shared across concurrent reconciliations without
/// in-process locking.
#[async_trait::async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch the object with the given identity.
    ///
    /// Returns `Ok(None)` when the object is absent; absence is not a
    /// failure, it drives the create path.
    async fn get(&self, identity: &Identity) -> Result<Option<StoredObject>, StoreError>;

    /// Create the object verbatim.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when a racing create won.
    async fn create(&self, object: &WorkloadObject) -> Result<StoredObject, StoreError>;

    /// Update the object, checking `version` against the store's current
    /// token.
    ///
    /// Fails with [`StoreError::Conflict`] when the token is stale.
    async fn update(
        &self,
        object: &WorkloadObject,
        version: &VersionToken,
    ) -> Result<StoredObject, StoreError>;
}
