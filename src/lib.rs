//! gcsim - a simulated heap with a mark-and-sweep garbage collector
//!
//! gcsim models a capacity-bounded heap for teaching purposes. Objects have
//! a size and a list of references but no address; a tracing collector frees
//! everything not reachable from the root set.
//!
//! # Features
//! - Capacity ledger with all-or-nothing allocation
//! - Randomized allocation workload from an owned, seedable generator
//! - Mark-and-sweep with an explicit work-list, safe on cycles
//! - Read-only snapshots with usage and fragmentation figures
//!
//! # Example
//! ```
//! use gcsim::{AllocationPlan, HeapSimulator};
//!
//! let mut heap = HeapSimulator::new(100).unwrap();
//! let child = heap.allocate_with(20, AllocationPlan::leaf()).unwrap();
//! heap.allocate_with(10, AllocationPlan::root().referencing([child])).unwrap();
//! heap.allocate_with(30, AllocationPlan::leaf()).unwrap();
//!
//! heap.collect();
//! assert_eq!(heap.snapshot().used(), 30);
//! ```

// Core
pub mod error;
pub mod gc;
pub mod snapshot;

// Configuration and front end
pub mod config;
pub mod session;

// Utilities
pub mod util;

// Re-export main types
pub use config::SimulatorConfig;
pub use error::HeapError;
pub use gc::{
    AllocationPlan, AllocationPolicy, CollectionReport, GcStats, HeapSimulator, MemoryObject,
    ObjectId, SharedHeap,
};
pub use session::{Session, SessionError};
pub use snapshot::HeapSnapshot;
