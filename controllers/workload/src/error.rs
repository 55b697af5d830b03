//! Controller-specific error types.
//!
//! This module defines the failure taxonomy of the reconcile engine. The
//! split between retryable and fatal errors is what the external scheduler
//! keys its requeue/backoff decisions on.

use crate::mutators::MutatorError;
use crate::options::ValidationError;
use cluster_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the workload controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Options failed validation; fatal, raised before any store access
    #[error("invalid options: {0}")]
    Validation(#[from] ValidationError),

    /// Cluster store failure (transport, conflict after the inline retry,
    /// racing create)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A mutator found the existing object structurally malformed; the
    /// pipeline was aborted and nothing was written
    #[error("mutator error: {0}")]
    Mutator(#[from] MutatorError),
}

impl ControllerError {
    /// True for failures the external scheduler should requeue with backoff
    pub fn is_retryable(&self) -> bool {
        match self {
            ControllerError::Store(e) => e.is_retryable(),
            ControllerError::Validation(_) | ControllerError::Mutator(_) => false,
        }
    }
}
