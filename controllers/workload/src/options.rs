//! Workload options and their builder.
//!
//! One setter per configuration field, then a pure `build()` that validates
//! everything at once and returns an immutable options value. Validation
//! touches no store and no network, so it is unit-testable in isolation, and
//! it reports every offending field rather than stopping at the first.

use regex::Regex;
use resources::{Affinity, Toleration, TopologySpreadConstraint};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

// registry[:port]/repo/name[:tag][@digest], loosely: the goal is to reject
// obviously broken references (spaces, empty segments), not to reimplement
// the distribution spec.
static IMAGE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+([._-][a-z0-9]+)*(:[0-9]+)?(/[a-z0-9]+([._-][a-z0-9]+)*)*(:[A-Za-z0-9][A-Za-z0-9._-]*)?(@sha256:[a-f0-9]{64})?$")
        .unwrap_or_else(|e| panic!("image reference regex: {e}"))
});

// Kubernetes-style quantity: integer or decimal with an optional suffix.
static QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?(m|k|M|G|T|Ki|Mi|Gi|Ti)?$")
        .unwrap_or_else(|e| panic!("quantity regex: {e}"))
});

/// A single invalid or missing option field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending option field
    pub field: &'static str,

    /// Why the field was rejected
    pub reason: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Validation failure listing every offending field, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .fields.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
pub struct ValidationError {
    /// All violations found during `build()`
    pub fields: Vec<FieldViolation>,
}

/// Immutable, validated workload options.
///
/// Constructed only via [`WorkloadOptionsBuilder::build`]; each option's
/// effect is scoped to exactly the mutator that owns the corresponding
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadOptions {
    pub(crate) image_reference: String,
    pub(crate) release_label: String,
    pub(crate) insecure_import_policy: bool,
    pub(crate) resource_requests: BTreeMap<String, String>,
    pub(crate) resource_limits: BTreeMap<String, String>,
    pub(crate) affinity: Option<Affinity>,
    pub(crate) tolerations: Vec<Toleration>,
    pub(crate) priority_class_name: Option<String>,
    pub(crate) topology_spread_constraints: Vec<TopologySpreadConstraint>,
    pub(crate) pod_template_annotations: BTreeMap<String, String>,
}

impl WorkloadOptions {
    /// Image reference the workload deploys from
    pub fn image_reference(&self) -> &str {
        &self.image_reference
    }

    /// Release label stamped onto the pod template
    pub fn release_label(&self) -> &str {
        &self.release_label
    }

    /// Whether image import may bypass certificate verification
    pub fn insecure_import_policy(&self) -> bool {
        self.insecure_import_policy
    }
}

/// Builder for [`WorkloadOptions`]. Setters record values without
/// cross-field checks; `build()` validates everything in one pass.
#[derive(Debug, Clone, Default)]
pub struct WorkloadOptionsBuilder {
    image_reference: Option<String>,
    release_label: Option<String>,
    insecure_import_policy: bool,
    resource_requests: BTreeMap<String, String>,
    resource_limits: BTreeMap<String, String>,
    affinity: Option<Affinity>,
    tolerations: Vec<Toleration>,
    priority_class_name: Option<String>,
    topology_spread_constraints: Vec<TopologySpreadConstraint>,
    pod_template_annotations: BTreeMap<String, String>,
}

impl WorkloadOptionsBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Image reference (required, must be a well-formed reference)
    pub fn image_reference(mut self, value: impl Into<String>) -> Self {
        self.image_reference = Some(value.into());
        self
    }

    /// Release label (required, non-empty)
    pub fn release_label(mut self, value: impl Into<String>) -> Self {
        self.release_label = Some(value.into());
        self
    }

    /// Allow image import over plain HTTP or with unverifiable certificates.
    ///
    /// Defaults to `false`. This used to be a fixed constant despite being
    /// nominally parameterized; it is exposed here so the policy is explicit
    /// and testable.
    pub fn insecure_import_policy(mut self, value: bool) -> Self {
        self.insecure_import_policy = value;
        self
    }

    /// Compute resource requests (quantity strings keyed by resource name)
    pub fn resource_requests(mut self, value: BTreeMap<String, String>) -> Self {
        self.resource_requests = value;
        self
    }

    /// Compute resource limits (quantity strings keyed by resource name)
    pub fn resource_limits(mut self, value: BTreeMap<String, String>) -> Self {
        self.resource_limits = value;
        self
    }

    /// Scheduling affinity rules
    pub fn affinity(mut self, value: Affinity) -> Self {
        self.affinity = Some(value);
        self
    }

    /// Taint tolerations
    pub fn tolerations(mut self, value: Vec<Toleration>) -> Self {
        self.tolerations = value;
        self
    }

    /// Priority class name
    pub fn priority_class_name(mut self, value: impl Into<String>) -> Self {
        self.priority_class_name = Some(value.into());
        self
    }

    /// Topology spread constraints
    pub fn topology_spread_constraints(mut self, value: Vec<TopologySpreadConstraint>) -> Self {
        self.topology_spread_constraints = value;
        self
    }

    /// Pod template annotations
    pub fn pod_template_annotations(mut self, value: BTreeMap<String, String>) -> Self {
        self.pod_template_annotations = value;
        self
    }

    /// Validate all fields and produce the immutable options value.
    ///
    /// Pure: no store or network access. Collects every violation so a
    /// caller can report all problems at once.
    pub fn build(self) -> Result<WorkloadOptions, ValidationError> {
        let mut violations = Vec::new();

        let image_reference = match self.image_reference {
            None => {
                violations.push(FieldViolation {
                    field: "imageReference",
                    reason: "required field is missing".to_string(),
                });
                String::new()
            }
            Some(value) if value.is_empty() => {
                violations.push(FieldViolation {
                    field: "imageReference",
                    reason: "required field is empty".to_string(),
                });
                value
            }
            Some(value) if !IMAGE_REFERENCE.is_match(&value) => {
                violations.push(FieldViolation {
                    field: "imageReference",
                    reason: format!("'{value}' is not a valid image reference"),
                });
                value
            }
            Some(value) => value,
        };

        let release_label = match self.release_label {
            None => {
                violations.push(FieldViolation {
                    field: "releaseLabel",
                    reason: "required field is missing".to_string(),
                });
                String::new()
            }
            Some(value) if value.is_empty() => {
                violations.push(FieldViolation {
                    field: "releaseLabel",
                    reason: "required field is empty".to_string(),
                });
                value
            }
            Some(value) => value,
        };

        for (name, quantity) in self.resource_requests.iter().chain(&self.resource_limits) {
            if !QUANTITY.is_match(quantity) {
                violations.push(FieldViolation {
                    field: "resources",
                    reason: format!("'{quantity}' is not a valid quantity for '{name}'"),
                });
            }
        }

        if let Some(name) = &self.priority_class_name
            && name.is_empty()
        {
            violations.push(FieldViolation {
                field: "priorityClassName",
                reason: "must be non-empty when set".to_string(),
            });
        }

        for constraint in &self.topology_spread_constraints {
            if constraint.max_skew < 1 {
                violations.push(FieldViolation {
                    field: "topologySpreadConstraints",
                    reason: format!(
                        "maxSkew must be at least 1, got {} for '{}'",
                        constraint.max_skew, constraint.topology_key
                    ),
                });
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError { fields: violations });
        }

        Ok(WorkloadOptions {
            image_reference,
            release_label,
            insecure_import_policy: self.insecure_import_policy,
            resource_requests: self.resource_requests,
            resource_limits: self.resource_limits,
            affinity: self.affinity,
            tolerations: self.tolerations,
            priority_class_name: self.priority_class_name,
            topology_spread_constraints: self.topology_spread_constraints,
            pod_template_annotations: self.pod_template_annotations,
        })
    }
}
