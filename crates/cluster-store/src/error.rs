//! Cluster store errors

use resources::Identity;
use thiserror::Error;

/// Errors that can occur when talking to the cluster store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Transport failure; retryable by the caller with backoff
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Write rejected because the version token was stale
    #[error("conflict updating {identity}: version token is stale")]
    Conflict {
        /// Identity of the object whose write was rejected
        identity: Identity,
    },

    /// Create rejected because a racing create won
    #[error("already exists: {0}")]
    AlreadyExists(Identity),

    /// Object not present in the store
    ///
    /// `get` maps this to `Ok(None)`; it only escapes from `update` when the
    /// object was deleted between the read and the write.
    #[error("not found: {0}")]
    NotFound(Identity),
}

impl StoreError {
    /// True for failures the caller may retry with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Conflict { .. })
    }
}
