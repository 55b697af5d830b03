//! Pod template annotation mutator

use super::{Mutator, MutatorError};
use resources::WorkloadObject;

/// Converges the pod template annotation set with the same merge semantics
/// as labels: desired keys are written, foreign keys (checksums, injection
/// markers from other operators) are preserved untouched.
#[derive(Debug, Clone, Copy)]
pub struct PodAnnotationsMutator;

impl Mutator for PodAnnotationsMutator {
    fn name(&self) -> &'static str {
        "pod-annotations"
    }

    fn ownership(&self) -> &'static [&'static str] {
        &["podTemplate.annotations"]
    }

    fn mutate(
        &self,
        desired: &WorkloadObject,
        existing: &mut WorkloadObject,
    ) -> Result<bool, MutatorError> {
        let mut changed = false;
        for (key, value) in &desired.pod_template.annotations {
            if existing.pod_template.annotations.get(key) != Some(value) {
                existing
                    .pod_template
                    .annotations
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

    fn object(annotations: &[(&str, &str)]) -> WorkloadObject {
        let mut obj = WorkloadObject::new(Identity::workload("default", "memcached"));
        obj.pod_template.annotations = annotations
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        obj
    }

    #[test]
    fn test_desired_annotations_are_merged_in() {
        let desired = object(&[("prometheus.io/scrape", "true")]);
        let mut existing = object(&[("kubectl.kubernetes.io/restartedAt", "2026-08-01")]);

        assert!(PodAnnotationsMutator.mutate(&desired, &mut existing).unwrap());
        assert_eq!(existing.pod_template.annotations.len(), 2);
        assert_eq!(
            existing
                .pod_template
                .annotations
                .get("kubectl.kubernetes.io/restartedAt")
                .map(String::as_str),
            Some("2026-08-01")
        );
    }

    #[test]
    fn test_idempotent() {
        let desired = object(&[("prometheus.io/scrape", "true")]);
        let mut existing = object(&[]);

        assert!(PodAnnotationsMutator.mutate(&desired, &mut existing).unwrap());
        let snapshot = existing.clone();
        assert!(!PodAnnotationsMutator.mutate(&desired, &mut existing).unwrap());
        assert_eq!(existing, snapshot);
    }
}
