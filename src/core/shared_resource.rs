use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

/// Raised when a [`Shared`] lock was poisoned by a panicking holder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("shared resource lock was poisoned")]
pub struct LockPoisoned;

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `Shared` gives synchronized access to a value of type `T` that is handed out
/// to worker threads. It uses an `Arc<RwLock<T>>` internally: many readers may
/// hold the value at once, a writer holds it alone.
///
/// Unlike a bare `RwLock`, acquiring a guard never panics. A poisoned lock is
/// reported as [`LockPoisoned`] so callers can propagate it with `?`.
///
/// # Examples
///
/// ```
/// use voxel_streaming_engine::core::Shared;
///
/// let counter = Shared::new(0);
/// *counter.write().unwrap() += 1;
/// assert_eq!(*counter.read().unwrap(), 1);
/// ```
///
/// ## Sharing Between Threads
/// ```
/// # use std::thread;
/// use voxel_streaming_engine::core::Shared;
///
/// let counter = Shared::new(0);
/// let counter_clone = counter.clone();
///
/// let handle = thread::spawn(move || {
///     *counter_clone.write().unwrap() += 1;
/// });
///
/// handle.join().unwrap();
/// assert_eq!(*counter.read().unwrap(), 1);
/// ```
pub struct Shared<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> Shared<T> {
    /// Creates a new `Shared` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard. Concurrent readers do not block each other.
    ///
    /// # Errors
    /// Returns [`LockPoisoned`] if a writer panicked while holding the lock.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, T>, LockPoisoned> {
        self.resource.read().map_err(|_| LockPoisoned)
    }

    /// Returns an exclusive write guard.
    ///
    /// # Errors
    /// Returns [`LockPoisoned`] if a previous holder panicked.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>, LockPoisoned> {
        self.resource.write().map_err(|_| LockPoisoned)
    }

    /// Number of handles currently sharing this resource.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.resource)
    }
}

impl<T: Send + Sync> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn readers_see_writes_from_other_threads() {
        let shared = Shared::new(Vec::<u32>::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || shared.write().unwrap().push(i))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let mut values = shared.read().unwrap().clone();
        values.sort();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn poisoned_lock_is_reported_not_panicked() {
        let shared = Shared::new(0u8);
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert_eq!(shared.read().err(), Some(LockPoisoned));
        assert!(shared.write().is_err());
    }

    #[test]
    fn handle_count_tracks_clones() {
        let shared = Shared::new(());
        assert_eq!(shared.handle_count(), 1);
        let other = shared.clone();
        assert_eq!(other.handle_count(), 2);
    }
}
