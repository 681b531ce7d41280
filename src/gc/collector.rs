//! Mark-and-sweep collector
//!
//! The collector works in three steps:
//! 1. Mark: walk the reference graph from every live root, remembering each
//!    visited id
//! 2. Sweep: drop every object that was not visited and give its size back
//! 3. Reclassify: refresh the cached reachability flag of the survivors
//!
//! Roots whose object is gone stay in the root set and are skipped.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use super::allocator::HeapSimulator;
use super::object::{MemoryObject, ObjectId};

/// Outcome of a single collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Objects found reachable
    pub marked: usize,
    /// Objects removed by the sweep
    pub freed_objects: usize,
    /// Capacity units given back
    pub freed_bytes: usize,
}

/// Cumulative statistics since the heap was created or last reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Number of collections performed
    pub collections: u64,
    /// Total objects allocated
    pub total_allocated: u64,
    /// Total objects freed
    pub total_freed: u64,
    /// Total capacity units allocated
    pub total_bytes_allocated: u64,
    /// Total capacity units freed
    pub total_bytes_freed: u64,
    /// Peak number of live objects
    pub peak_objects: usize,
    /// Peak `used`
    pub peak_used: usize,
}

impl GcStats {
    fn record(&mut self, report: &CollectionReport) {
        self.collections += 1;
        self.total_freed += report.freed_objects as u64;
        self.total_bytes_freed += report.freed_bytes as u64;
    }
}

/// Run a full collection on the heap
pub(super) fn collect<R>(heap: &mut HeapSimulator<R>) -> CollectionReport {
    let marked = mark(&heap.objects, &heap.roots);
    let (freed_objects, freed_bytes) = sweep(heap, &marked);

    for (id, obj) in heap.objects.iter_mut() {
        obj.reachable = marked.contains(id);
    }

    let report = CollectionReport {
        marked: marked.len(),
        freed_objects,
        freed_bytes,
    };
    heap.stats.record(&report);

    debug!(
        "collection #{}: marked {}, freed {} objects ({} units), {} live",
        heap.stats.collections,
        report.marked,
        report.freed_objects,
        report.freed_bytes,
        heap.objects.len()
    );

    report
}

/// Compute the set of ids reachable from the live roots
///
/// Uses an explicit work-list so deep chains cannot overflow the call stack.
/// References to ids that are not in `objects` are skipped.
pub(crate) fn mark(
    objects: &BTreeMap<ObjectId, MemoryObject>,
    roots: &BTreeSet<ObjectId>,
) -> BTreeSet<ObjectId> {
    let mut marked = BTreeSet::new();
    let mut worklist: Vec<ObjectId> = roots
        .iter()
        .copied()
        .filter(|id| objects.contains_key(id))
        .collect();

    while let Some(id) = worklist.pop() {
        let Some(obj) = objects.get(&id) else {
            continue;
        };
        if !marked.insert(id) {
            continue;
        }
        worklist.extend(
            obj.references()
                .iter()
                .copied()
                .filter(|child| !marked.contains(child) && objects.contains_key(child)),
        );
    }

    marked
}

/// Remove unmarked objects, returning (objects freed, units freed)
fn sweep<R>(heap: &mut HeapSimulator<R>, marked: &BTreeSet<ObjectId>) -> (usize, usize) {
    let mut freed_objects = 0;
    let mut freed_bytes = 0;

    heap.objects.retain(|id, obj| {
        if marked.contains(id) {
            return true;
        }
        trace!("sweep {} size={}", id, obj.size());
        freed_objects += 1;
        freed_bytes += obj.size();
        false
    });
    heap.live.retain(|id| marked.contains(id));
    heap.used -= freed_bytes;

    (freed_objects, freed_bytes)
}
