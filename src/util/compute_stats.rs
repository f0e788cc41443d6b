use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for what the lazy slots of one registry have done.
#[derive(Debug)]
pub struct ComputeStats {
    computed: AtomicUsize,
    failed: AtomicUsize,
    contended: AtomicUsize,
}

impl ComputeStats {
    pub fn new() -> Self {
        Self {
            computed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            contended: AtomicUsize::new(0),
        }
    }

    /// Computations that produced a cached value.
    pub fn get_computed(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// Computations that returned an error.
    pub fn get_failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Reads that found another thread holding the first-access guard.
    pub fn get_contended(&self) -> usize {
        self.contended.load(Ordering::Relaxed)
    }

    pub(crate) fn add_computed(&self) {
        self.computed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_contended(&self) {
        self.contended.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for ComputeStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::ComputeStats;

    #[test]
    fn empty() {
        let stats = ComputeStats::new();
        assert_eq!(stats.get_computed(), 0);
        assert_eq!(stats.get_failed(), 0);
        assert_eq!(stats.get_contended(), 0);
    }

    #[test]
    fn single_thread_interleaved() {
        let stats = ComputeStats::new();
        for i in 0..10 {
            assert_eq!(stats.get_computed(), i);
            assert_eq!(stats.get_failed(), i);
            stats.add_computed();
            stats.add_failed();
        }
        assert_eq!(stats.get_contended(), 0);
    }

    #[test]
    fn multi_thread_interleaved() {
        let stats = Arc::new(ComputeStats::new());
        let mut threads = Vec::with_capacity(10);
        for _ in 0..10 {
            let stats = stats.clone();
            let handle = thread::spawn(move || {
                for _ in 0..10 {
                    stats.add_computed();
                    stats.add_contended();
                }
            });
            threads.push(handle);
        }
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(stats.get_computed(), 100);
        assert_eq!(stats.get_contended(), 100);
        assert_eq!(stats.get_failed(), 0);
    }
}
