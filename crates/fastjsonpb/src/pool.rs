use alloc::boxed::Box;
use core::fmt;

use crossbeam_queue::ArrayQueue;

/// Number of idle instances a [`Pool`] keeps by default.
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Bounded free list of boxed instances.
///
/// `acquire` hands out an idle instance or allocates a fresh default one;
/// `release` returns an instance for reuse. The pool never resets what it is
/// given: callers release only zeroed instances (generated `destruct` does
/// this). Instances released while the pool is full are dropped.
///
/// The free list is lock-free, so a pool can be shared between threads by
/// reference.
pub struct Pool<T> {
    free: ArrayQueue<Box<T>>,
}

impl<T> Pool<T> {
    /// Creates a pool holding at most [`DEFAULT_POOL_CAPACITY`] idle
    /// instances.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a pool holding at most `capacity` idle instances. A capacity
    /// of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Returns `item` to the free list.
    pub fn release(&self, item: Box<T>) {
        if self.free.push(item).is_err() {
            log::trace!(
                "pool of {} full, dropping released instance",
                core::any::type_name::<T>()
            );
        }
    }

    /// Number of idle instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether no idle instance is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Maximum number of idle instances kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }
}

impl<T: Default> Pool<T> {
    /// Takes an idle instance, or allocates `T::default()` if there is none.
    #[must_use]
    pub fn acquire(&self) -> Box<T> {
        self.free.pop().unwrap_or_default()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.free.len())
            .field("capacity", &self.free.capacity())
            .finish()
    }
}
