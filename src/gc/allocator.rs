//! Capacity-bounded allocator for the simulated heap
//!
//! The heap keeps a ledger instead of real memory:
//! ```text
//! +-----------------------------------------------+
//! | #1 | #2 |  #4  | ...          free            |
//! +-----------------------------------------------+
//! ^ 0            ^ used                  capacity ^
//! ```
//!
//! Objects carry no address. `used` is the sum of live object sizes and an
//! allocation succeeds only while `used + size <= capacity`. Live ids are also
//! kept in a flat ascending list so picking reference targets never walks the
//! object map. Every allocation
//! decides three things at random (cached reachability, outgoing references
//! and root membership) from an owned generator, so a seeded heap replays the
//! same workload.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::collector::GcStats;
use super::object::{MemoryObject, ObjectId};
use crate::config::SimulatorConfig;
use crate::error::HeapError;
use crate::snapshot::HeapSnapshot;

/// Probabilities used when an allocation decides its own shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationPolicy {
    /// Chance that a new object starts out classified as reachable
    pub reachable_probability: f64,
    /// Chance that a new object joins the root set
    pub root_probability: f64,
    /// Upper bound (inclusive) of the uniform reference fan-out
    pub max_fan_out: usize,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        AllocationPolicy {
            reachable_probability: 0.7,
            root_probability: 0.3,
            max_fan_out: 3,
        }
    }
}

impl AllocationPolicy {
    /// Check that both probabilities lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), HeapError> {
        if !(0.0..=1.0).contains(&self.reachable_probability) {
            return Err(HeapError::InvalidArgument(
                "reachable probability must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.root_probability) {
            return Err(HeapError::InvalidArgument(
                "root probability must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// The shape of a single allocation
///
/// `HeapSimulator::allocate` draws one of these from its policy;
/// `HeapSimulator::allocate_with` accepts one from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Initial cached reachability
    pub reachable: bool,
    /// Outgoing references, kept in order and with duplicates
    pub references: Vec<ObjectId>,
    /// Whether the new object joins the root set
    pub root: bool,
}

impl AllocationPlan {
    /// A root object with no references
    pub fn root() -> Self {
        AllocationPlan {
            reachable: true,
            references: Vec::new(),
            root: true,
        }
    }

    /// A non-root object with no references
    pub fn leaf() -> Self {
        AllocationPlan {
            reachable: true,
            references: Vec::new(),
            root: false,
        }
    }

    /// Replace the outgoing references
    pub fn referencing(mut self, references: impl IntoIterator<Item = ObjectId>) -> Self {
        self.references = references.into_iter().collect();
        self
    }
}

/// The simulated heap
///
/// Owns the capacity ledger, the object graph, the root set and the random
/// generator that drives allocation.
pub struct HeapSimulator<R = StdRng> {
    capacity: usize,
    pub(super) used: usize,
    pub(super) objects: BTreeMap<ObjectId, MemoryObject>,
    /// Live ids in ascending order, for O(1) reference sampling
    pub(super) live: Vec<ObjectId>,
    pub(super) roots: BTreeSet<ObjectId>,
    next_id: ObjectId,
    policy: AllocationPolicy,
    pub(super) stats: GcStats,
    rng: R,
}

fn check_capacity(capacity: usize) -> Result<(), HeapError> {
    if capacity == 0 {
        return Err(HeapError::InvalidArgument("capacity must be positive"));
    }
    Ok(())
}

impl HeapSimulator<StdRng> {
    /// Create an empty heap driven by an entropy-seeded generator
    pub fn new(capacity: usize) -> Result<Self, HeapError> {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Create an empty heap from a configuration
    ///
    /// A configured seed makes every allocation decision reproducible.
    pub fn from_config(config: &SimulatorConfig) -> Result<Self, HeapError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config.capacity, rng)?.with_policy(config.policy)
    }
}

impl<R> HeapSimulator<R> {
    /// Create an empty heap that draws from `rng`
    pub fn with_rng(capacity: usize, rng: R) -> Result<Self, HeapError> {
        check_capacity(capacity)?;
        Ok(HeapSimulator {
            capacity,
            used: 0,
            objects: BTreeMap::new(),
            live: Vec::new(),
            roots: BTreeSet::new(),
            next_id: ObjectId::FIRST,
            policy: AllocationPolicy::default(),
            stats: GcStats::default(),
            rng,
        })
    }

    /// Replace the allocation policy
    pub fn with_policy(mut self, policy: AllocationPolicy) -> Result<Self, HeapError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of the sizes of all live objects
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.used
    }

    #[inline]
    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    #[inline]
    pub fn stats(&self) -> &GcStats {
        &self.stats
    }

    pub fn object(&self, id: ObjectId) -> Option<&MemoryObject> {
        self.objects.get(&id)
    }

    /// Live objects in ascending id order
    pub fn objects(&self) -> impl Iterator<Item = &MemoryObject> {
        self.objects.values()
    }

    #[inline]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Root ids, stale ones included
    #[inline]
    pub fn roots(&self) -> &BTreeSet<ObjectId> {
        &self.roots
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> HeapSnapshot<'_> {
        HeapSnapshot::new(self.capacity, self.used, &self.objects, &self.roots)
    }

    /// Allocate an object with an explicit shape
    ///
    /// The references are stored as given. An id that does not name a live
    /// object is ignored by the collector while it dangles; an id that has not
    /// been issued yet becomes a real edge once that id is allocated.
    pub fn allocate_with(
        &mut self,
        size: usize,
        plan: AllocationPlan,
    ) -> Result<ObjectId, HeapError> {
        self.check_fits(size)?;

        let id = self.next_id;
        self.next_id = id.next();

        debug!(
            "alloc {} size={} refs={} root={} reachable={}",
            id,
            size,
            plan.references.len(),
            plan.root,
            plan.reachable
        );

        self.objects.insert(
            id,
            MemoryObject::new(id, size, plan.reachable, plan.references),
        );
        self.live.push(id);
        self.used += size;
        if plan.root {
            self.roots.insert(id);
        }

        self.stats.total_allocated += 1;
        self.stats.total_bytes_allocated += size as u64;
        self.stats.peak_used = self.stats.peak_used.max(self.used);
        self.stats.peak_objects = self.stats.peak_objects.max(self.objects.len());

        Ok(id)
    }

    /// Discard every object and root and start over with `capacity`
    ///
    /// Ids restart at 1. The random generator keeps its sequence.
    pub fn reset(&mut self, capacity: usize) -> Result<(), HeapError> {
        check_capacity(capacity)?;
        info!(
            "reset heap: capacity {} -> {}, dropping {} objects",
            self.capacity,
            capacity,
            self.objects.len()
        );
        self.reset_to(capacity);
        Ok(())
    }

    /// Reset with the current capacity
    pub fn clear(&mut self) {
        info!("clear heap, dropping {} objects", self.objects.len());
        self.reset_to(self.capacity);
    }

    fn reset_to(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.used = 0;
        self.objects.clear();
        self.live.clear();
        self.roots.clear();
        self.next_id = ObjectId::FIRST;
        self.stats = GcStats::default();
    }

    fn check_fits(&self, size: usize) -> Result<(), HeapError> {
        if size == 0 {
            return Err(HeapError::InvalidArgument("size must be positive"));
        }
        let available = self.free();
        if size > available {
            debug!("alloc refused: requested {}, available {}", size, available);
            return Err(HeapError::OutOfMemory {
                requested: size,
                available,
            });
        }
        Ok(())
    }
}

impl<R: Rng> HeapSimulator<R> {
    /// Allocate an object whose shape is drawn from the policy
    ///
    /// Fails without touching the heap or the generator when `size` is zero
    /// or does not fit.
    pub fn allocate(&mut self, size: usize) -> Result<ObjectId, HeapError> {
        self.check_fits(size)?;
        let plan = self.draw_plan();
        self.allocate_with(size, plan)
    }

    /// Draw reachability, references and root membership, in that order
    fn draw_plan(&mut self) -> AllocationPlan {
        let reachable = self.rng.gen_bool(self.policy.reachable_probability);

        let mut references = Vec::new();
        if !self.live.is_empty() {
            let fan_out = self.rng.gen_range(0..=self.policy.max_fan_out);
            for _ in 0..fan_out {
                references.push(self.live[self.rng.gen_range(0..self.live.len())]);
            }
        }

        let root = self.rng.gen_bool(self.policy.root_probability);

        AllocationPlan {
            reachable,
            references,
            root,
        }
    }
}
