//! Mutator contract and pipeline.
//!
//! A mutator is a single-concern merge function: it compares the desired
//! object against the existing one and conditionally rewrites exactly the
//! sub-fields it owns. Mutators must be idempotent (a second run with the
//! same desired object reports no change) and must preserve everything
//! outside their declared ownership set bit-for-bit. Two mutators must never
//! declare overlapping ownership; the pipeline exposes a check for that
//! invariant so the test suite can enforce it, but it is not evaluated per
//! call.

mod affinity;
mod container_resources;
mod image_trigger;
mod pod_annotations;
mod pod_labels;
mod priority_class;
mod tolerations;
mod topology_spread;

pub use affinity::AffinityMutator;
pub use container_resources::ContainerResourcesMutator;
pub use image_trigger::ImageTriggerMutator;
pub use pod_annotations::PodAnnotationsMutator;
pub use pod_labels::PodLabelsMutator;
pub use priority_class::PriorityClassMutator;
pub use tolerations::TolerationsMutator;
pub use topology_spread::TopologySpreadMutator;

use resources::WorkloadObject;
use thiserror::Error;
use tracing::{debug, trace};

/// A mutator found the existing object structurally malformed at one of its
/// owned paths. Not used for ordinary "needs update" signaling, which is
/// always the `changed` return value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("mutator '{mutator}' failed at {path}: {reason}")]
pub struct MutatorError {
    /// Name of the mutator that failed
    pub mutator: &'static str,

    /// Owned sub-path that could not be located or interpreted
    pub path: String,

    /// What was wrong with the object at that path
    pub reason: String,
}

/// A named, ownership-scoped merge of desired state into an existing object.
pub trait Mutator: Send + Sync {
    /// Name of the mutator, used in diagnostics and errors
    fn name(&self) -> &'static str;

    /// Sub-paths of the existing object this mutator may write. Used for
    /// diagnostics and the disjointness invariant check in tests.
    fn ownership(&self) -> &'static [&'static str];

    /// Converge the owned sub-fields of `existing` toward `desired`.
    ///
    /// Returns `Ok(true)` when anything was rewritten, `Ok(false)` when the
    /// owned fields already matched. Fails only when the existing object is
    /// structurally malformed at an owned path.
    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError>;
}

/// An ordered composition of mutators applied as one unit of work.
///
/// Built once and reused across reconcile calls. Order must not affect the
/// result given disjoint ownership; it only determines which error surfaces
/// first. Atomicity against the store is the engine's responsibility: it
/// runs the pipeline on a private clone and discards the clone on error.
pub struct MutationPipeline {
    mutators: Vec<Box<dyn Mutator>>,
}

impl std::fmt::Debug for MutationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationPipeline")
            .field(
                "mutators",
                &self.mutators.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl MutationPipeline {
    /// Compose a pipeline from the given mutators, applied in order
    pub fn new(mutators: Vec<Box<dyn Mutator>>) -> Self {
        Self { mutators }
    }

    /// The full workload pipeline: every mutator the controller registers
    pub fn workload() -> Self {
        Self::new(vec![
            Box::new(ImageTriggerMutator),
            Box::new(ContainerResourcesMutator),
            Box::new(AffinityMutator),
            Box::new(TolerationsMutator),
            Box::new(PodLabelsMutator),
            Box::new(PriorityClassMutator),
            Box::new(TopologySpreadMutator),
            Box::new(PodAnnotationsMutator),
        ])
    }

    /// Names of the registered mutators, in application order
    pub fn mutator_names(&self) -> Vec<&'static str> {
        self.mutators.iter().map(|m| m.name()).collect()
    }

    /// Apply every mutator in order against the same `(desired, existing)`
    /// pair, accumulating `changed` via OR. Stops on the first error; the
    /// caller must discard `existing` in that case, since earlier mutators
    /// may already have rewritten it.
    pub fn apply(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        let mut changed = false;
        for mutator in &self.mutators {
            let mutated = mutator.mutate(desired, existing)?;
            if mutated {
                debug!(
                    "mutator '{}' changed {} at {:?}",
                    mutator.name(),
                    existing.identity,
                    mutator.ownership()
                );
            } else {
                trace!("mutator '{}' found {} up-to-date", mutator.name(), existing.identity);
            }
            changed |= mutated;
        }
        Ok(changed)
    }

    /// Check the ownership disjointness invariant across all registered
    /// mutators. Returns the first offending pair, if any. Intended for
    /// tests; registration does not run this per call.
    pub fn verify_disjoint_ownership(&self) -> Result<(), (&'static str, &'static str, String)> {
        for (i, a) in self.mutators.iter().enumerate() {
            for b in &self.mutators[i + 1..] {
                for pa in a.ownership() {
                    for pb in b.ownership() {
                        if paths_overlap(pa, pb) {
                            return Err((a.name(), b.name(), format!("{pa} vs {pb}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// Two ownership paths overlap when one is a segment-wise prefix of the other
// ("podTemplate.labels" covers "podTemplate.labels.app", not
// "podTemplate.labelsExtra").
fn paths_overlap(a: &str, b: &str) -> bool {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_overlap_on_prefix() {
        assert!(paths_overlap("podTemplate.labels", "podTemplate.labels.app"));
        assert!(paths_overlap("triggers", "triggers"));
        assert!(!paths_overlap("podTemplate.labels", "podTemplate.annotations"));
        assert!(!paths_overlap("podTemplate.labels", "podTemplateLabels"));
    }

    #[test]
    fn test_workload_pipeline_registers_every_mutator() {
        let names = MutationPipeline::workload().mutator_names();
        assert_eq!(
            names,
            vec![
                "image-trigger",
                "container-resources",
                "affinity",
                "tolerations",
                "pod-labels",
                "priority-class",
                "topology-spread",
                "pod-annotations",
            ]
        );
    }

    #[test]
    fn test_workload_pipeline_ownership_is_disjoint() {
        MutationPipeline::workload()
            .verify_disjoint_ownership()
            .unwrap_or_else(|(a, b, paths)| panic!("{a} and {b} overlap: {paths}"));
    }

    #[test]
    fn test_overlapping_pipeline_is_rejected() {
        // Same mutator twice declares the same ownership set.
        let pipeline = MutationPipeline::new(vec![
            Box::new(PodLabelsMutator),
            Box::new(PodLabelsMutator),
        ]);
        let (a, b, _) = pipeline.verify_disjoint_ownership().unwrap_err();
        assert_eq!(a, "pod-labels");
        assert_eq!(b, "pod-labels");
    }
}
