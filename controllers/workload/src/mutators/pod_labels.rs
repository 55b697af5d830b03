//! Pod template label mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template label set. Desired keys are merged in,
/// overwriting stale values; label keys the desired object does not mention
/// belong to other actors and are never removed.
#[derive(Debug, Clone, Copy)]
pub struct PodLabelsMutator;

impl Mutator for PodLabelsMutator {
    fn name(&self) -> &'static str {
        "pod-labels"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.labels"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        let mut changed = false;
        for (key, value) in &desired.pod_template.labels {
            if existing.pod_template.labels.get(key) != Some(value) {
                existing
                    .pod_template
                    .labels
                    .insert(key.clone(), value.clone());
                changed = true;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resources::Identity;

    fn object(labels: &[(&str, &str)]) -> WorkloadObject {
        let mut obj = WorkloadObject::new(Identity::workload("default", "memcached"));
        obj.pod_template.labels = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        obj
    }

    #[test]
    fn test_missing_and_stale_labels_are_written() {
        let desired = object(&[("app", "memcached"), ("release", "2.15")]);
        let mut existing = object(&[("release", "2.14")]);

        assert!(PodLabelsMutator.mutate(&desired, &mut existing).unwrap());
        assert_eq!(
            existing.pod_template.labels.get("app").map(String::as_str),
            Some("memcached")
        );
        assert_eq!(
            existing.pod_template.labels.get("release").map(String::as_str),
            Some("2.15")
        );
    }

    #[test]
    fn test_foreign_labels_are_never_removed() {
        let desired = object(&[("app", "memcached")]);
        let mut existing = object(&[("istio.io/rev", "stable")]);

        PodLabelsMutator.mutate(&desired, &mut existing).unwrap();
        assert_eq!(
            existing.pod_template.labels.get("istio.io/rev").map(String::as_str),
            Some("stable")
        );
    }

    #[test]
    fn test_idempotent() {
        let desired = object(&[("app", "memcached")]);
        let mut existing = object(&[]);

        assert!(PodLabelsMutator.mutate(&desired, &mut existing).unwrap());
        let snapshot = existing.clone();
        assert!(!PodLabelsMutator.mutate(&desired, &mut existing).unwrap());
        assert_eq!(existing, snapshot);
    }
}
