use std::sync::atomic::{AtomicUsize, Ordering};

/// A thread-safe source of consecutive ids.
///
/// Ids are never reused, so an id identifies one registry, type, or object
/// for the lifetime of the process.
///
/// # Usage
/// ```ignore
/// let ids = IdAllocator::new();
/// assert_eq!(ids.next(), 0);
/// assert_eq!(ids.next(), 1);
/// ```
#[derive(Debug)]
pub struct IdAllocator {
    inner: AtomicUsize,
}

impl IdAllocator {
    pub const fn new() -> Self {
        Self {
            inner: AtomicUsize::new(0),
        }
    }

    /// Hands out the next unused id.
    ///
    /// This takes `&self`, so one allocator can be shared between threads.
    pub fn next(&self) -> usize {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// The number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
