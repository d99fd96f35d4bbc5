//! Active driver instance registry.
//!
//! Shared by every driver constructed against it and by the resource tracker
//! that counts them. Independent test runners can each hold their own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    instances: HashMap<u64, Arc<AtomicBool>>,
}

/// Registry of live driver instances. Cloning yields another handle to the
/// same registry.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

/// A driver's membership in a registry.
#[derive(Debug)]
pub struct InstanceLease {
    id: u64,
    released: Arc<AtomicBool>,
}

impl InstanceLease {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the registry force-released this instance.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an instance.
    pub fn register(&self) -> InstanceLease {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let released = Arc::new(AtomicBool::new(false));
        inner.instances.insert(id, released.clone());
        debug!(id, count = inner.instances.len(), "Registered driver instance");
        InstanceLease { id, released }
    }

    /// Remove an instance. Unknown leases are ignored.
    pub fn unregister(&self, lease: &InstanceLease) {
        let mut inner = self.lock();
        if inner.instances.remove(&lease.id).is_some() {
            debug!(id = lease.id, count = inner.instances.len(), "Unregistered driver instance");
        }
    }

    /// Number of live instances.
    pub fn count(&self) -> usize {
        self.lock().instances.len()
    }

    /// Release every live instance. Returns how many were released.
    pub fn cleanup_all(&self) -> usize {
        let mut inner = self.lock();
        let released = inner.instances.len();
        for (_, flag) in inner.instances.drain() {
            flag.store(true, Ordering::SeqCst);
        }
        if released > 0 {
            info!(released, "Released all driver instances");
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_count() {
        let registry = InstanceRegistry::new();
        let a = registry.register();
        let b = registry.register();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.count(), 2);

        registry.unregister(&a);
        registry.unregister(&a);
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = InstanceRegistry::new();
        let other = registry.clone();
        let _lease = other.register();
        assert_eq!(registry.count(), 1);

        let independent = InstanceRegistry::new();
        assert_eq!(independent.count(), 0);
    }

    #[test]
    fn test_cleanup_all_releases_leases() {
        let registry = InstanceRegistry::new();
        let lease = registry.register();
        registry.register();
        assert_eq!(registry.cleanup_all(), 2);
        assert!(lease.is_released());
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.cleanup_all(), 0);
    }
}
