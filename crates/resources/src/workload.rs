//! Workload object model
//!
//! A `WorkloadObject` is the unit of reconciliation: a deployment-like
//! resource with image-change triggers and a pod template. The same type
//! serves as the desired object (built from configuration, owned fields
//! only) and the existing object (read from the store, which additionally
//! carries status and foreign metadata keys).

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A deployment-like managed resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadObject {
    /// Identity of the resource (never mutated)
    pub identity: Identity,

    /// Image change triggers (owned by the image trigger mutator)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<ImageChangeTrigger>,

    /// Pod template describing the runtime shape of the workload
    pub pod_template: PodTemplate,

    /// Runtime status, written by the cluster, never by a mutator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkloadStatus>,
}

impl WorkloadObject {
    /// Create an empty workload object for the given identity
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            triggers: Vec::new(),
            pod_template: PodTemplate::default(),
            status: None,
        }
    }

    /// Find a container in the pod template by name
    pub fn container(&self, name: &str) -> Option<&Container> {
        self.pod_template.containers.iter().find(|c| c.name == name)
    }

    /// Find a container in the pod template by name, mutably
    pub fn container_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.pod_template
            .containers
            .iter_mut()
            .find(|c| c.name == name)
    }

    /// Find the trigger whose image stream reference matches `from_name`
    pub fn trigger_from(&self, from_name: &str) -> Option<&ImageChangeTrigger> {
        self.triggers.iter().find(|t| t.from.name == from_name)
    }
}

/// Pod template carried by a workload object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplate {
    /// Pod labels. Desired labels are merged in; foreign keys are preserved.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Pod annotations. Same merge semantics as labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Containers in the pod
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    /// Scheduling affinity rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    /// Taint tolerations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,

    /// Priority class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    /// Topology spread constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topology_spread_constraints: Vec<TopologySpreadConstraint>,
}

/// A single container in the pod template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name, unique within the pod template
    pub name: String,

    /// Image reference the container runs
    pub image: String,

    /// Compute resource requests and limits
    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
}

impl Container {
    /// Create a container with no resource requirements
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            resources: ResourceRequirements::default(),
        }
    }
}

/// Compute resource requests and limits, keyed by resource name
/// (e.g., "cpu", "memory") with quantity strings (e.g., "250m", "96Mi").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Minimum resources the container requests
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,

    /// Maximum resources the container may consume
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
}

impl ResourceRequirements {
    /// True when neither requests nor limits are set
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.limits.is_empty()
    }
}

/// Trigger that redeploys the workload when its source image changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeTrigger {
    /// Whether the trigger fires automatically on image change
    pub automatic: bool,

    /// Containers that receive the new image when the trigger fires
    pub container_names: Vec<String>,

    /// Image stream tag the trigger watches
    pub from: ImageStreamRef,
}

/// Reference to an image stream tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageStreamRef {
    /// Image stream tag name (e.g., "system-memcached:2.15")
    pub name: String,

    /// Allow import over plain HTTP or with unverifiable certificates
    #[serde(default)]
    pub insecure_import: bool,
}

/// Scheduling affinity rules for the pod template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Affinity {
    /// Required node affinity terms (OR of terms, AND of expressions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeAffinityRules>,

    /// Pod anti-affinity spreading pods across a topology domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_anti: Option<PodAntiAffinityRules>,
}

/// Required node affinity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeAffinityRules {
    /// Node selector terms; a node must satisfy at least one term
    pub required_terms: Vec<SelectorTerm>,
}

/// Pod anti-affinity over a topology domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PodAntiAffinityRules {
    /// Topology key the anti-affinity spreads across
    pub topology_key: String,

    /// Labels selecting the peer pods to spread away from
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

/// One selector term: the AND of its match expressions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorTerm {
    /// Expressions that must all hold for the term to match
    pub match_expressions: Vec<SelectorRequirement>,
}

/// A single label selector requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectorRequirement {
    /// Label key the requirement applies to
    pub key: String,

    /// Operator relating the key to the values
    pub operator: SelectorOperator,

    /// Values for In/NotIn operators; empty for Exists/DoesNotExist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Label selector operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectorOperator {
    /// Key's value must be one of the listed values
    In,
    /// Key's value must not be any of the listed values
    NotIn,
    /// Key must be present
    Exists,
    /// Key must be absent
    DoesNotExist,
}

/// Taint toleration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Toleration {
    /// Taint key the toleration applies to; None tolerates all keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Relationship between the key and the value
    #[serde(default)]
    pub operator: TolerationOperator,

    /// Taint value to match (Equal operator only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Taint effect to tolerate; None tolerates all effects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Seconds the pod stays bound after the taint is added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toleration_seconds: Option<i64>,
}

/// Toleration operators.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TolerationOperator {
    /// Key must exist with the given value
    #[default]
    Equal,
    /// Key must exist, any value
    Exists,
}

/// Constraint spreading pods across topology domains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopologySpreadConstraint {
    /// Maximum permitted skew between topology domains
    pub max_skew: i32,

    /// Node label key defining the topology domain
    pub topology_key: String,

    /// What to do with a pod that cannot satisfy the constraint
    pub when_unsatisfiable: UnsatisfiableAction,

    /// Labels selecting the pods to count when computing skew
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}

/// Scheduler behavior when a spread constraint cannot be satisfied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnsatisfiableAction {
    /// Refuse to schedule the pod
    DoNotSchedule,
    /// Schedule anyway, preferring lower skew
    ScheduleAnyway,
}

/// Runtime status written by the cluster. The reconciler reads it for
/// diagnostics only; no mutator may write it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    /// Generation of the object the cluster last acted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Replicas currently ready
    #[serde(default)]
    pub ready_replicas: u32,

    /// Human-readable condition strings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_lookup() {
        let mut obj = WorkloadObject::new(Identity::workload("default", "memcached"));
        obj.pod_template
            .containers
            .push(Container::new("memcached", "memcached:1.6"));

        assert!(obj.container("memcached").is_some());
        assert!(obj.container("sidecar").is_none());
    }

    #[test]
    fn test_trigger_lookup_by_from_name() {
        let mut obj = WorkloadObject::new(Identity::workload("default", "memcached"));
        obj.triggers.push(ImageChangeTrigger {
            automatic: true,
            container_names: vec!["memcached".to_string()],
            from: ImageStreamRef {
                name: "system-memcached:2.15".to_string(),
                insecure_import: false,
            },
        });

        assert!(obj.trigger_from("system-memcached:2.15").is_some());
        assert!(obj.trigger_from("system-memcached:latest").is_none());
    }

    #[test]
    fn test_resource_requirements_is_empty() {
        let mut res = ResourceRequirements::default();
        assert!(res.is_empty());
        res.requests.insert("cpu".to_string(), "250m".to_string());
        assert!(!res.is_empty());
    }

    #[test]
    fn test_workload_serde_round_trip_preserves_foreign_fields() {
        let mut obj = WorkloadObject::new(Identity::workload("prod", "backend"));
        obj.pod_template
            .annotations
            .insert("external-operator/checksum".to_string(), "abc123".to_string());
        obj.status = Some(WorkloadStatus {
            observed_generation: Some(7),
            ready_replicas: 3,
            conditions: vec!["Available".to_string()],
        });

        let json = serde_json::to_string(&obj).unwrap();
        let back: WorkloadObject = serde_json::from_str(&json).unwrap();
        assert_eq!(obj, back);
    }
}
