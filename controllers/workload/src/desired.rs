//! Desired state construction.
//!
//! The engine does not build payloads itself; it asks a
//! [`DesiredStateBuilder`] for the fully-formed desired object. The builder
//! is pure so desired state is reproducible and reconcile calls stay
//! deterministic. `OptionsDesiredStateBuilder` renders the desired object
//! from validated [`WorkloadOptions`].

use crate::options::WorkloadOptions;
use resources::{
    Container, Identity, ImageChangeTrigger, ImageStreamRef, ResourceRequirements, WorkloadObject,
};

/// Produces the full desired object for a resource identity. Pure, no I/O.
pub trait DesiredStateBuilder: Send + Sync {
    /// Build the desired object for the given identity from current
    /// configuration. Called fresh on every reconcile; the result is never
    /// cached by the engine.
    fn build(&self, identity: &Identity) -> WorkloadObject;
}

/// Renders desired workload objects from validated options.
#[derive(Debug, Clone)]
pub struct OptionsDesiredStateBuilder {
    options: WorkloadOptions,
}

impl OptionsDesiredStateBuilder {
    /// Create a builder over the given options
    pub fn new(options: WorkloadOptions) -> Self {
        Self { options }
    }

    /// The options this builder renders from
    pub fn options(&self) -> &WorkloadOptions {
        &self.options
    }
}

impl DesiredStateBuilder for OptionsDesiredStateBuilder {
    fn build(&self, identity: &Identity) -> WorkloadObject {
        let opts = &self.options;
        let mut object = WorkloadObject::new(identity.clone());

        object.triggers.push(ImageChangeTrigger {
            automatic: true,
            container_names: vec![identity.name.clone()],
            from: ImageStreamRef {
                name: format!("{}:{}", identity.name, opts.release_label),
                insecure_import: opts.insecure_import_policy,
            },
        });

        object.pod_template.containers.push(Container {
            name: identity.name.clone(),
            image: opts.image_reference.clone(),
            resources: ResourceRequirements {
                requests: opts.resource_requests.clone(),
                limits: opts.resource_limits.clone(),
            },
        });

        object
            .pod_template
            .labels
            .insert("app".to_string(), identity.name.clone());
        object
            .pod_template
            .labels
            .insert("release".to_string(), opts.release_label.clone());
        object.pod_template.annotations = opts.pod_template_annotations.clone();

        object.pod_template.affinity = opts.affinity.clone();
        object.pod_template.tolerations = opts.tolerations.clone();
        object.pod_template.priority_class_name = opts.priority_class_name.clone();
        object.pod_template.topology_spread_constraints =
            opts.topology_spread_constraints.clone();

        object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WorkloadOptionsBuilder;

    fn options() -> WorkloadOptions {
        WorkloadOptionsBuilder::new()
            .image_reference("quay.io/acme/memcached:2.15")
            .release_label("2.15")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_is_pure_and_deterministic() {
        let builder = OptionsDesiredStateBuilder::new(options());
        let id = Identity::workload("prod", "system-memcached");
        assert_eq!(builder.build(&id), builder.build(&id));
    }

    #[test]
    fn test_build_carries_only_owned_fields() {
        let builder = OptionsDesiredStateBuilder::new(options());
        let desired = builder.build(&Identity::workload("prod", "system-memcached"));

        // Desired objects never carry cluster-owned state.
        assert!(desired.status.is_none());
        assert_eq!(desired.triggers.len(), 1);
        assert_eq!(
            desired.triggers[0].from.name,
            "system-memcached:2.15"
        );
        assert!(!desired.triggers[0].from.insecure_import);
        assert_eq!(desired.pod_template.containers[0].name, "system-memcached");
    }

    #[test]
    fn test_insecure_import_policy_flows_into_trigger() {
        let opts = WorkloadOptionsBuilder::new()
            .image_reference("quay.io/acme/memcached:2.15")
            .release_label("2.15")
            .insecure_import_policy(true)
            .build()
            .unwrap();
        let builder = OptionsDesiredStateBuilder::new(opts);
        let desired = builder.build(&Identity::workload("prod", "system-memcached"));
        assert!(desired.triggers[0].from.insecure_import);
    }
}
