//! Requeue policy for the external scheduler.
//!
//! Maps reconcile results to requeue decisions, tracking a per-identity
//! backoff so one flapping resource does not affect the others. Retryable
//! failures (transport, unresolved conflicts) back off; fatal failures
//! (validation, malformed objects) stop until the input changes.

use crate::backoff::RequeueBackoff;
use crate::error::ControllerError;
use resources::Identity;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// What the scheduler should do with a resource after a reconcile call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueDecision {
    /// Try again after the given delay
    Requeue(Duration),

    /// Do not requeue; wait for a change to the resource or its options
    Stop,
}

/// Per-identity backoff bookkeeping.
#[derive(Debug)]
pub struct RequeuePolicy {
    base_secs: u64,
    max_secs: u64,
    states: Mutex<HashMap<Identity, RequeueBackoff>>,
}

impl RequeuePolicy {
    /// Create a policy with the given backoff bounds in seconds
    pub fn new(base_secs: u64, max_secs: u64) -> Self {
        Self {
            base_secs,
            max_secs,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Record a successful reconcile; clears the identity's backoff
    pub fn on_success(&self, identity: &Identity) {
        if let Ok(mut states) = self.states.lock()
            && states.remove(identity).is_some()
        {
            debug!("cleared backoff for {} after success", identity);
        }
    }

    /// Record a failed reconcile and decide whether to requeue
    pub fn on_error(&self, identity: &Identity, error: &ControllerError) -> RequeueDecision {
        if !error.is_retryable() {
            warn!("not requeueing {}: {}", identity, error);
            return RequeueDecision::Stop;
        }

        let Ok(mut states) = self.states.lock() else {
            return RequeueDecision::Requeue(Duration::from_secs(self.base_secs));
        };
        let backoff = states
            .entry(identity.clone())
            .or_insert_with(|| RequeueBackoff::new(self.base_secs, self.max_secs));
        let delay = backoff.next_delay();
        debug!("requeueing {} in {:?}: {}", identity, delay, error);
        RequeueDecision::Requeue(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutators::MutatorError;
    use crate::options::WorkloadOptionsBuilder;
    use cluster_store::StoreError;

    fn identity() -> Identity {
        Identity::workload("prod", "system-memcached")
    }

    fn unavailable() -> ControllerError {
        ControllerError::Store(StoreError::Unavailable("injected".to_string()))
    }

    #[test]
    fn test_retryable_errors_escalate_backoff() {
        let policy = RequeuePolicy::new(5, 300);
        let id = identity();

        assert_eq!(
            policy.on_error(&id, &unavailable()),
            RequeueDecision::Requeue(Duration::from_secs(5))
        );
        assert_eq!(
            policy.on_error(&id, &unavailable()),
            RequeueDecision::Requeue(Duration::from_secs(5))
        );
        assert_eq!(
            policy.on_error(&id, &unavailable()),
            RequeueDecision::Requeue(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_success_resets_backoff() {
        let policy = RequeuePolicy::new(5, 300);
        let id = identity();

        policy.on_error(&id, &unavailable());
        policy.on_error(&id, &unavailable());
        policy.on_error(&id, &unavailable());
        policy.on_success(&id);

        assert_eq!(
            policy.on_error(&id, &unavailable()),
            RequeueDecision::Requeue(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_identities_back_off_independently() {
        let policy = RequeuePolicy::new(5, 300);
        let flapping = identity();
        let healthy = Identity::workload("prod", "backend");

        policy.on_error(&flapping, &unavailable());
        policy.on_error(&flapping, &unavailable());
        policy.on_error(&flapping, &unavailable());

        assert_eq!(
            policy.on_error(&healthy, &unavailable()),
            RequeueDecision::Requeue(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_fatal_errors_stop() {
        let policy = RequeuePolicy::new(5, 300);

        let validation = ControllerError::Validation(
            WorkloadOptionsBuilder::new().build().unwrap_err(),
        );
        assert_eq!(
            policy.on_error(&identity(), &validation),
            RequeueDecision::Stop
        );

        let mutator = ControllerError::Mutator(MutatorError {
            mutator: "container-resources",
            path: "podTemplate.containers".to_string(),
            reason: "no container named 'memcached'".to_string(),
        });
        assert_eq!(
            policy.on_error(&identity(), &mutator),
            RequeueDecision::Stop
        );
    }
}
