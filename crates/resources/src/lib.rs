//! Workload resource data model
//!
//! Plain value types shared by the reconcile engine and the cluster store.
//! Desired and existing objects use the same `WorkloadObject` type: a desired
//! object carries only the fields the reconciler owns, an existing object is a
//! superset that also carries fields owned by other actors (status, foreign
//! labels and annotations).

pub mod identity;
pub mod workload;

pub use identity::*;
pub use workload::*;
