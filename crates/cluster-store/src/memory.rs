//! In-memory cluster store for unit testing
//!
//! This module provides a [`ClusterStore`] implementation backed by a
//! `HashMap`, with call counters and fault injection so tests can assert
//! exactly which store calls a reconcile issued and drive conflict and
//! transport-failure scenarios without a running cluster.

use crate::error::StoreError;
use crate::store::{ClusterStore, StoredObject};
use resources::{Identity, VersionToken, WorkloadObject};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory store for testing
///
/// Versions are a monotonic counter rendered as the token string, bumped on
/// every successful write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<Identity, (WorkloadObject, u64)>>>,
    next_version: Arc<AtomicU64>,
    // Fault injection
    conflicts_remaining: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    // Call counters
    get_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            next_version: Arc::new(AtomicU64::new(1)),
            ..Self::default()
        }
    }

    /// Seed an object into the store (for test setup), returning its token
    pub fn seed(&self, object: WorkloadObject) -> VersionToken {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let identity = object.identity.clone();
        self.objects
            .lock()
            .unwrap()
            .insert(identity, (object, version));
        VersionToken::new(version.to_string())
    }

    /// Read an object back without counting as a `get` call (for assertions)
    pub fn peek(&self, identity: &Identity) -> Option<WorkloadObject> {
        self.objects
            .lock()
            .unwrap()
            .get(identity)
            .map(|(obj, _)| obj.clone())
    }

    /// Make the next `n` updates fail with a conflict
    pub fn fail_updates_with_conflict(&self, n: usize) {
        self.conflicts_remaining.store(n, Ordering::SeqCst);
    }

    /// Make every call fail with `Unavailable` until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls issued so far
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `create` calls issued so far
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `update` calls issued so far
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "injected transport failure".to_string(),
            ));
        }
        Ok(())
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ClusterStore for MemoryStore {
    async fn get(&self, identity: &Identity) -> Result<Option<StoredObject>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(identity)
            .map(|(object, version)| StoredObject {
                object: object.clone(),
                version: VersionToken::new(version.to_string()),
            }))
    }

    async fn create(&self, object: &WorkloadObject) -> Result<StoredObject, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&object.identity) {
            return Err(StoreError::AlreadyExists(object.identity.clone()));
        }
        let version = self.bump_version();
        objects.insert(object.identity.clone(), (object.clone(), version));
        Ok(StoredObject {
            object: object.clone(),
            version: VersionToken::new(version.to_string()),
        })
    }

    async fn update(
        &self,
        object: &WorkloadObject,
        version: &VersionToken,
    ) -> Result<StoredObject, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        // Injected conflicts take priority so tests can simulate a racing
        // writer even when the token would otherwise be current.
        let remaining = self.conflicts_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict {
                identity: object.identity.clone(),
            });
        }

        let mut objects = self.objects.lock().unwrap();
        let Some((_, current)) = objects.get(&object.identity) else {
            return Err(StoreError::NotFound(object.identity.clone()));
        };
        if current.to_string() != version.as_str() {
            return Err(StoreError::Conflict {
                identity: object.identity.clone(),
            });
        }
        let new_version = self.bump_version();
        objects.insert(object.identity.clone(), (object.clone(), new_version));
        Ok(StoredObject {
            object: object.clone(),
            version: VersionToken::new(new_version.to_string()),
        })
    }
}
