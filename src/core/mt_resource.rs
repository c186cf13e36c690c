use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted handle to shared state.
///
/// `MtResource` wraps an `Arc<RwLock<T>>` so that collaborators living on other threads
/// (a remote store's delivery thread, a second viewer in a test) can share one value with
/// the frame loop. Clones share the same underlying value.
///
/// A writer that panicked while holding the lock does not take the rest of the engine down
/// with it: poisoned locks are recovered and the last written value is returned.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use voxel_world_engine::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let handle = counter.clone();
///
/// std::thread::spawn(move || *handle.get_mut() += 1)
///     .join()
///     .expect("worker thread panicked");
///
/// assert_eq!(*counter.get(), 1);
/// ```
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` owning `resource`.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard over the contained value.
    ///
    /// Concurrent readers do not block each other.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns an exclusive write guard over the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live handles sharing this value.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
