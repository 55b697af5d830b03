//! Toleration list mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template's toleration list. The list is owned as a
/// whole and replaced when it differs from the desired one.
#[derive(Debug, Clone, Copy)]
pub struct TolerationsMutator;

impl Mutator for TolerationsMutator {
    fn name(&self) -> &'static str {
        "tolerations"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.tolerations"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        if existing.pod_template.tolerations != desired.pod_template.tolerations {
            existing.pod_template.tolerations = desired.pod_template.tolerations.clone();
            return Ok(true);
        }
        Ok(false)
    }
}
