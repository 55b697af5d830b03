//! Priority class mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template's priority class name.
#[derive(Debug, Clone, Copy)]
pub struct PriorityClassMutator;

impl Mutator for PriorityClassMutator {
    fn name(&self) -> &'static str {
        "priority-class"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.priorityClassName"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        if existing.pod_template.priority_class_name != desired.pod_template.priority_class_name {
            existing.pod_template.priority_class_name =
                desired.pod_template.priority_class_name.clone();
            return Ok(true);
        }
        Ok(false)
    }
}
