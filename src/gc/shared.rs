//! A heap that can be driven from several threads
//!
//! Every operation holds one lock for its whole duration. Operations are
//! short, so there is no finer-grained locking.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use rand::rngs::StdRng;

use super::allocator::HeapSimulator;
use super::collector::CollectionReport;
use super::object::ObjectId;
use crate::error::HeapError;
use crate::snapshot::HeapSnapshot;

/// Shared handle to a single simulated heap
pub struct SharedHeap<R = StdRng> {
    inner: Arc<Mutex<HeapSimulator<R>>>,
}

impl<R> Clone for SharedHeap<R> {
    fn clone(&self) -> Self {
        SharedHeap {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> SharedHeap<R> {
    pub fn new(heap: HeapSimulator<R>) -> Self {
        SharedHeap {
            inner: Arc::new(Mutex::new(heap)),
        }
    }

    pub fn collect(&self) -> CollectionReport {
        self.inner.lock().collect()
    }

    pub fn reset(&self, capacity: usize) -> Result<(), HeapError> {
        self.inner.lock().reset(capacity)
    }

    /// Run `f` on a snapshot taken under the lock
    pub fn with_snapshot<T>(&self, f: impl FnOnce(&HeapSnapshot<'_>) -> T) -> T {
        let heap = self.inner.lock();
        f(&heap.snapshot())
    }
}

impl<R: Rng> SharedHeap<R> {
    pub fn allocate(&self, size: usize) -> Result<ObjectId, HeapError> {
        self.inner.lock().allocate(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_concurrent_allocations() {
        let heap = HeapSimulator::with_rng(1000, StdRng::seed_from_u64(1)).unwrap();
        let shared = SharedHeap::new(heap);

        std::thread::scope(|s| {
            for _ in 0..4 {
                let shared = shared.clone();
                s.spawn(move || {
                    for _ in 0..25 {
                        shared.allocate(2).unwrap();
                    }
                });
            }
        });

        shared.with_snapshot(|snap| {
            assert_eq!(snap.object_count(), 100);
            assert_eq!(snap.used(), 200);
            let ids: Vec<u64> = snap.objects().map(|o| o.id().as_u64()).collect();
            assert_eq!(ids, (1..=100).collect::<Vec<_>>());
        });
    }

    #[test]
    fn test_capacity_respected_across_threads() {
        let heap = HeapSimulator::with_rng(50, StdRng::seed_from_u64(2)).unwrap();
        let shared = SharedHeap::new(heap);

        std::thread::scope(|s| {
            for _ in 0..8 {
                let shared = shared.clone();
                s.spawn(move || {
                    for _ in 0..10 {
                        let _ = shared.allocate(3);
                    }
                });
            }
        });

        shared.with_snapshot(|snap| {
            assert!(snap.used() <= 50);
            assert_eq!(snap.object_count(), 16);
        });

        shared.collect();
        shared.reset(10).unwrap();
        shared.with_snapshot(|snap| {
            assert_eq!(snap.capacity(), 10);
            assert_eq!(snap.object_count(), 0);
        });
    }
}
