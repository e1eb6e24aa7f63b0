//! Fixed-capacity resource pools
//!
//! The engine draws procedure contexts, TX buffers and notification buffers
//! from free-list pools preallocated at construction. Exhaustion is reported
//! to the caller, which parks the procedure and retries on a later run tick;
//! it is never treated as an error.

/// Fixed-capacity free-list pool
#[derive(Debug)]
pub struct Pool<T> {
    capacity: usize,
    free: Vec<T>,
}

impl<T: Default> Pool<T> {
    /// Create a pool holding `capacity` default-initialized elements
    pub fn new(capacity: usize) -> Self {
        let mut free = Vec::with_capacity(capacity);
        free.resize_with(capacity, T::default);
        Self { capacity, free }
    }
}

impl<T> Pool<T> {
    /// Take an element from the free list, or `None` on exhaustion
    pub fn acquire(&mut self) -> Option<T> {
        self.free.pop()
    }

    /// Return an element to the free list
    pub fn release(&mut self, item: T) {
        debug_assert!(self.free.len() < self.capacity);
        self.free.push(item);
    }

    /// Report availability without acquiring
    pub fn peek(&self) -> bool {
        !self.free.is_empty()
    }

    /// Number of elements currently on the free list
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of elements handed out and not yet released
    pub fn in_use(&self) -> usize {
        self.capacity - self.free.len()
    }

    /// Total number of elements owned by the pool
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
