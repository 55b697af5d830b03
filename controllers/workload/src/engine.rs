//! Reconcile engine.
//!
//! Orchestrates fetch → (create | diff-and-maybe-update) against the cluster
//! store for one resource identity per call. The engine holds no state across
//! calls: the desired object is built fresh from configuration, the existing
//! object is fetched fresh, and the mutation pipeline runs against a private
//! clone so nothing reaches the store unless every mutator succeeds.
//!
//! Concurrency: the external scheduler may invoke `reconcile` for distinct
//! identities in parallel; write safety for a single identity is the store's
//! version-token check. On a stale token the engine performs exactly one
//! re-fetch-and-reapply cycle before surfacing the conflict, keeping latency
//! bounded and leaving further retries to the scheduler's backoff policy.

use crate::desired::DesiredStateBuilder;
use crate::error::ControllerError;
use crate::mutators::MutationPipeline;
use cluster_store::{ClusterStore, StoreError, StoredObject};
use resources::{Identity, WorkloadObject};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal result of one reconcile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The object was absent and has been created verbatim from desired state
    Created(WorkloadObject),

    /// At least one mutator changed the object and the store accepted the write
    Updated(WorkloadObject),

    /// The existing object already matched desired state; no write was issued
    Unchanged(WorkloadObject),

    /// The caller's cancellation signal fired before the next store call
    Canceled,
}

/// Converges existing workload objects toward desired state.
pub struct ReconcileEngine {
    store: Arc<dyn ClusterStore>,
    builder: Arc<dyn DesiredStateBuilder>,
    pipeline: MutationPipeline,
}

impl std::fmt::Debug for ReconcileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl ReconcileEngine {
    /// Create an engine over the given store, desired-state builder, and
    /// mutation pipeline. The pipeline is composed once and reused for every
    /// reconcile call.
    pub fn new(
        store: Arc<dyn ClusterStore>,
        builder: Arc<dyn DesiredStateBuilder>,
        pipeline: MutationPipeline,
    ) -> Self {
        Self {
            store,
            builder,
            pipeline,
        }
    }

    /// Reconcile one resource identity.
    ///
    /// `cancel` is checked before every store call; once it fires the engine
    /// returns [`ReconcileOutcome::Canceled`] without issuing further store
    /// calls, so partially applied in-memory changes never reach the store.
    pub async fn reconcile(
        &self,
        identity: &Identity,
        cancel: &CancellationToken,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let desired = self.builder.build(identity);

        if cancel.is_cancelled() {
            debug!("reconcile of {} canceled before fetch", identity);
            return Ok(ReconcileOutcome::Canceled);
        }

        match self.store.get(identity).await? {
            None => self.create(identity, &desired, cancel).await,
            Some(stored) => {
                match self.diff_and_update(&desired, stored, cancel).await {
                    Err(ControllerError::Store(StoreError::Conflict { .. })) => {
                        // A benign race: another writer bumped the version
                        // between our read and write. One re-fetch-and-reapply
                        // absorbs it; a second conflict surfaces.
                        warn!("conflict updating {}, re-fetching once", identity);
                        self.retry_after_conflict(identity, &desired, cancel).await
                    }
                    result => result,
                }
            }
        }
    }

    async fn create(
        &self,
        identity: &Identity,
        desired: &WorkloadObject,
        cancel: &CancellationToken,
    ) -> Result<ReconcileOutcome, ControllerError> {
        if cancel.is_cancelled() {
            debug!("reconcile of {} canceled before create", identity);
            return Ok(ReconcileOutcome::Canceled);
        }

        match self.store.create(desired).await {
            Ok(stored) => {
                info!("created {}", identity);
                Ok(ReconcileOutcome::Created(stored.object))
            }
            Err(StoreError::AlreadyExists(_)) => {
                // A racing create won. The object exists now, so one
                // re-fetch-and-reapply cycle takes the update path instead.
                warn!("racing create won for {}, re-fetching once", identity);
                self.retry_after_conflict(identity, desired, cancel).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn retry_after_conflict(
        &self,
        identity: &Identity,
        desired: &WorkloadObject,
        cancel: &CancellationToken,
    ) -> Result<ReconcileOutcome, ControllerError> {
        if cancel.is_cancelled() {
            debug!("reconcile of {} canceled before conflict re-fetch", identity);
            return Ok(ReconcileOutcome::Canceled);
        }

        match self.store.get(identity).await? {
            Some(stored) => self.diff_and_update(desired, stored, cancel).await,
            // Deleted between the conflict and the re-fetch. Surface the
            // race rather than creating here; the scheduler will requeue and
            // the next reconcile takes the create path cleanly.
            None => Err(StoreError::NotFound(identity.clone()).into()),
        }
    }

    async fn diff_and_update(
        &self,
        desired: &WorkloadObject,
        stored: StoredObject,
        cancel: &CancellationToken,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let StoredObject { object, version } = stored;

        // Private working copy: mutator effects only reach the store if the
        // whole pipeline succeeds and something actually changed.
        let mut working = object.clone();
        let changed = self.pipeline.apply(desired, &mut working)?;

        if !changed {
            debug!("{} already up-to-date, skipping update", working.identity);
            return Ok(ReconcileOutcome::Unchanged(working));
        }

        if cancel.is_cancelled() {
            debug!("reconcile of {} canceled before update", working.identity);
            return Ok(ReconcileOutcome::Canceled);
        }

        let updated = self.store.update(&working, &version).await?;
        info!("updated {}", updated.object.identity);
        Ok(ReconcileOutcome::Updated(updated.object))
    }
}
