//! Read-only view of the simulated heap
//!
//! A snapshot borrows the heap, so the heap cannot change while one is alive.
//! Front ends use it to draw the memory map and the derived figures.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::gc::{self, MemoryObject, ObjectId};
use crate::util::size::format_size;

/// Borrowed view of capacity, usage, objects and roots
#[derive(Debug, Clone, Copy)]
pub struct HeapSnapshot<'a> {
    capacity: usize,
    used: usize,
    objects: &'a BTreeMap<ObjectId, MemoryObject>,
    roots: &'a BTreeSet<ObjectId>,
}

impl<'a> HeapSnapshot<'a> {
    pub(crate) fn new(
        capacity: usize,
        used: usize,
        objects: &'a BTreeMap<ObjectId, MemoryObject>,
        roots: &'a BTreeSet<ObjectId>,
    ) -> Self {
        HeapSnapshot {
            capacity,
            used,
            objects,
            roots,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.used
    }

    /// Live objects in ascending id order
    pub fn objects(&self) -> impl Iterator<Item = &'a MemoryObject> + 'a {
        self.objects.values()
    }

    pub fn object(&self, id: ObjectId) -> Option<&'a MemoryObject> {
        self.objects.get(&id)
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Root ids, stale ones included
    #[inline]
    pub fn roots(&self) -> &'a BTreeSet<ObjectId> {
        self.roots
    }

    #[inline]
    pub fn is_root(&self, id: ObjectId) -> bool {
        self.roots.contains(&id)
    }

    /// Roots whose object has been swept
    pub fn stale_roots(&self) -> impl Iterator<Item = ObjectId> + 'a {
        let objects = self.objects;
        self.roots
            .iter()
            .copied()
            .filter(move |id| !objects.contains_key(id))
    }

    /// Ids reachable from the live roots, recomputed from the graph
    pub fn reachable_set(&self) -> BTreeSet<ObjectId> {
        gc::mark(self.objects, self.roots)
    }

    /// Percentage of capacity in use
    pub fn usage_percent(&self) -> f64 {
        self.used as f64 / self.capacity as f64 * 100.0
    }

    /// Percentage of capacity that is free, or 0 when the heap is empty or full
    ///
    /// The heap has no address layout, so free space stands in for
    /// fragmentation.
    pub fn fragmentation(&self) -> f64 {
        if self.objects.is_empty() || self.free() == 0 {
            return 0.0;
        }
        self.free() as f64 / self.capacity as f64 * 100.0
    }
}

impl fmt::Display for HeapSnapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {}  Used: {}  Free: {}",
            format_size(self.capacity),
            format_size(self.used),
            format_size(self.free())
        )?;
        write!(
            f,
            "Usage: {:.1}%  Objects: {}  Roots: {}  Fragmentation: {:.1}%",
            self.usage_percent(),
            self.object_count(),
            self.roots.len(),
            self.fragmentation()
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::gc::{AllocationPlan, HeapSimulator};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn heap(capacity: usize) -> HeapSimulator {
        HeapSimulator::with_rng(capacity, StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn test_empty_snapshot() {
        let heap = heap(1024);
        let snap = heap.snapshot();
        assert_eq!(snap.capacity(), 1024);
        assert_eq!(snap.used(), 0);
        assert_eq!(snap.free(), 1024);
        assert_eq!(snap.object_count(), 0);
        assert_eq!(snap.fragmentation(), 0.0);
        assert_eq!(snap.usage_percent(), 0.0);
    }

    #[test]
    fn test_derived_figures() {
        let mut heap = heap(200);
        heap.allocate_with(50, AllocationPlan::root()).unwrap();
        let snap = heap.snapshot();
        assert_eq!(snap.usage_percent(), 25.0);
        assert_eq!(snap.fragmentation(), 75.0);
        assert_eq!(snap.object_count(), 1);
    }

    #[test]
    fn test_full_heap_has_no_fragmentation() {
        let mut heap = heap(100);
        heap.allocate_with(100, AllocationPlan::root()).unwrap();
        assert_eq!(heap.snapshot().fragmentation(), 0.0);
    }

    #[test]
    fn test_reachable_set_is_live() {
        let mut heap = heap(100);
        let root = heap.allocate_with(10, AllocationPlan::root()).unwrap();
        let garbage = heap.allocate_with(10, AllocationPlan::leaf()).unwrap();

        let snap = heap.snapshot();
        // cached flag says reachable, the graph says otherwise
        assert!(snap.object(garbage).unwrap().is_reachable());
        let reachable = snap.reachable_set();
        assert!(reachable.contains(&root));
        assert!(!reachable.contains(&garbage));
        assert!(snap.is_root(root));
        assert!(!snap.is_root(garbage));
        assert_eq!(snap.stale_roots().count(), 0);
    }

    #[test]
    fn test_snapshot_does_not_mutate() {
        let mut heap = heap(1000);
        for _ in 0..20 {
            heap.allocate(10).unwrap();
        }
        let before: Vec<_> = heap.objects().cloned().collect();
        let snap = heap.snapshot();
        let _ = snap.reachable_set();
        let _ = snap.to_string();
        let after: Vec<_> = heap.objects().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(heap.used(), 200);
    }

    #[test]
    fn test_display() {
        let mut heap = heap(2048);
        heap.allocate_with(512, AllocationPlan::root()).unwrap();
        let text = heap.snapshot().to_string();
        assert_eq!(
            text,
            "Total: 2.0 GB  Used: 512 MB  Free: 1.5 GB\n\
             Usage: 25.0%  Objects: 1  Roots: 1  Fragmentation: 75.0%"
        );
    }
}
