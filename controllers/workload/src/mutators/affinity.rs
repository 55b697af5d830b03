//! Scheduling affinity mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template's affinity rules. The whole affinity subtree is
/// owned: when the existing value differs from the desired one it is replaced
/// outright, including clearing it when the desired object carries none.
#[derive(Debug, Clone, Copy)]
pub struct AffinityMutator;

impl Mutator for AffinityMutator {
    fn name(&self) -> &'static str {
        "affinity"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.affinity"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        if existing.pod_template.affinity != desired.pod_template.affinity {
            existing.pod_template.affinity = desired.pod_template.affinity.clone();
            return Ok(true);
        }
        Ok(false)
    }
}
