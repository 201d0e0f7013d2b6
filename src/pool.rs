//! Object Pooling
//!
//! Views, tweens and particle components are recycled instead of freshly
//! allocated. Every pooled type follows the same two-step lifecycle:
//!
//! - `reuse(args)` re-initializes every mutable field from fresh arguments,
//!   treating whatever was there before as garbage
//! - `clear_data()` drops references and resets fields to inert defaults
//!   before the instance goes back to the pool
//!
//! After `clear_data()` an instance must own nothing external. After
//! `reuse(args)` it must be indistinguishable from `create(args)`.

/// Lifecycle contract for recyclable objects.
pub trait Poolable: Default {
    /// Arguments a freshly constructed instance would take
    type Args;

    /// Re-initialize all fields from `args`
    fn reuse(&mut self, args: Self::Args);

    /// Release references and reset fields to inert defaults.
    /// Must be safe to call more than once.
    fn clear_data(&mut self);

    /// Construct a fresh instance (equivalent to default + reuse)
    fn create(args: Self::Args) -> Self {
        let mut item = Self::default();
        item.reuse(args);
        item
    }
}

/// A bounded free list of recycled instances
#[derive(Debug)]
pub struct Pool<T: Poolable> {
    /// Cleared instances ready for reuse (LIFO)
    free: Vec<T>,
    /// Maximum number of instances kept around
    capacity: usize,
    /// Instances built from scratch
    created: usize,
    /// Instances handed out from the free list
    reused: usize,
}

impl<T: Poolable> Pool<T> {
    /// Create a pool keeping at most `capacity` idle instances
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity.min(64)),
            capacity,
            created: 0,
            reused: 0,
        }
    }

    /// Take an instance from the pool (or build one) initialized with `args`
    pub fn acquire(&mut self, args: T::Args) -> T {
        match self.free.pop() {
            Some(mut item) => {
                self.reused += 1;
                item.reuse(args);
                item
            }
            None => {
                self.created += 1;
                T::create(args)
            }
        }
    }

    /// Clear an instance and return it to the pool.
    /// Returns `false` if the pool was full and the instance was dropped.
    pub fn release(&mut self, mut item: T) -> bool {
        item.clear_data();
        if self.free.len() >= self.capacity {
            return false;
        }
        self.free.push(item);
        true
    }

    /// Number of idle instances
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Maximum number of idle instances kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances built from scratch so far
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of acquisitions served from the free list
    pub fn reused(&self) -> usize {
        self.reused
    }

    /// Drop every idle instance
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl<T: Poolable> Default for Pool<T> {
    fn default() -> Self {
        Self::new(64)
    }
}
