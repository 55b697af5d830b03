//! Topology spread constraint mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template's topology spread constraints. The constraint
/// list is owned as a whole and replaced when it differs.
#[derive(Debug, Clone, Copy)]
pub struct TopologySpreadMutator;

impl Mutator for TopologySpreadMutator {
    fn name(&self) -> &'static str {
        "topology-spread"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.topologySpreadConstraints"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        if existing.pod_template.topology_spread_constraints
            != desired.pod_template.topology_spread_constraints
        {
            existing.pod_template.topology_spread_constraints =
                desired.pod_template.topology_spread_constraints.clone();
            return Ok(true);
        }
        Ok(false)
    }
}
