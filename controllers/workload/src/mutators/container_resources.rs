//! Container resource requests/limits mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges compute resource requests and limits for every container the
/// desired object names. Containers are matched by name; a desired container
/// missing from the existing pod template is a structural malformation, not
/// a drift the resources mutator can repair.
#[derive(Debug, Clone, Copy)]
pub struct ContainerResourcesMutator;

impl Mutator for ContainerResourcesMutator {
    fn name(&self) -> &'static str {
        "container-resources"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.containers.resources"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        let mut changed = false;

        for desired_container in &desired.pod_template.containers {
            let Some(current) = existing.container_mut(&desired_container.name) else {
                return Err(MutatorError {
                    mutator: self.name(),
                    path: "podTemplate.containers".to_string(),
                    reason: format!(
                        "no container named '{}' in existing pod template",
                        desired_container.name
                    ),
                });
            };
            if current.resources != desired_container.resources {
                current.resources = desired_container.resources.clone();
                changed = true;
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resources::{Container, Identity, ResourceRequirements};
    use std::collections::BTreeMap;

    fn quantities(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn object(containers: Vec<Container>) -> WorkloadObject {
        let mut obj = WorkloadObject::new(Identity::workload("default", "memcached"));
        obj.pod_template.containers = containers;
        obj
    }

    #[test]
    fn test_differing_resources_are_rewritten() {
        let mut wanted = Container::new("memcached", "memcached:1.6");
        wanted.resources = ResourceRequirements {
            requests: quantities(&[("cpu", "250m"), ("memory", "96Mi")]),
            limits: quantities(&[("cpu", "500m")]),
        };
        let desired = object(vec![wanted.clone()]);
        let mut existing = object(vec![Container::new("memcached", "memcached:1.6")]);

        let changed = ContainerResourcesMutator
            .mutate(&desired, &mut existing)
            .unwrap();
        assert!(changed);
        assert_eq!(existing.pod_template.containers[0].resources, wanted.resources);
    }

    #[test]
    fn test_image_is_not_touched() {
        // The image belongs to the trigger flow, not this mutator.
        let mut wanted = Container::new("memcached", "memcached:1.6");
        wanted.resources.requests = quantities(&[("cpu", "250m")]);
        let desired = object(vec![wanted]);
        let mut existing = object(vec![Container::new("memcached", "memcached:1.5-rolled-back")]);

        ContainerResourcesMutator
            .mutate(&desired, &mut existing)
            .unwrap();
        assert_eq!(
            existing.pod_template.containers[0].image,
            "memcached:1.5-rolled-back"
        );
    }

    #[test]
    fn test_idempotent() {
        let mut wanted = Container::new("memcached", "memcached:1.6");
        wanted.resources.limits = quantities(&[("memory", "128Mi")]);
        let desired = object(vec![wanted]);
        let mut existing = object(vec![Container::new("memcached", "memcached:1.6")]);

        assert!(ContainerResourcesMutator.mutate(&desired, &mut existing).unwrap());
        let snapshot = existing.clone();
        assert!(!ContainerResourcesMutator.mutate(&desired, &mut existing).unwrap());
        assert_eq!(existing, snapshot);
    }

    #[test]
    fn test_missing_container_is_an_error() {
        let desired = object(vec![Container::new("memcached", "memcached:1.6")]);
        let mut existing = object(vec![]);

        let err = ContainerResourcesMutator
            .mutate(&desired, &mut existing)
            .unwrap_err();
        assert_eq!(err.mutator, "container-resources");
        assert_eq!(err.path, "podTemplate.containers");
        assert!(err.reason.contains("memcached"));
    }
}
