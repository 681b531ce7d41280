//! Garbage collector module
//!
//! The simulated heap uses a tracing mark-and-sweep collector.
//! Only objects reachable from the root set survive a collection;
//! everything else is dropped and its size returned to the ledger.
//!
//! Properties of the collector:
//! - Cycles and self-references are handled by the visited set
//! - Dangling references and stale roots are ignored
//! - A second collection in a row frees nothing

use std::collections::BTreeSet;

mod allocator;
mod collector;
mod object;
mod shared;

pub use allocator::{AllocationPlan, AllocationPolicy, HeapSimulator};
pub use collector::{CollectionReport, GcStats};
pub use object::{MemoryObject, ObjectId};
pub use shared::SharedHeap;

pub(crate) use collector::mark;

impl<R> HeapSimulator<R> {
    /// Run a full mark-and-sweep collection
    pub fn collect(&mut self) -> CollectionReport {
        collector::collect(self)
    }

    /// Ids reachable from the live roots right now
    ///
    /// Unlike the cached flag on each object this is always up to date.
    pub fn reachable_set(&self) -> BTreeSet<ObjectId> {
        collector::mark(&self.objects, &self.roots)
    }
}
