//! Objects living in the simulated heap

use std::fmt;

/// Identifier of a simulated object
///
/// Ids are handed out in increasing order starting at 1 and are never reused
/// by the heap that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The first id issued by a fresh heap
    pub const FIRST: ObjectId = ObjectId(1);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        ObjectId(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The id issued right after this one
    #[inline]
    pub(crate) const fn next(self) -> Self {
        ObjectId(self.0 + 1)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(raw: u64) -> Self {
        ObjectId(raw)
    }
}

/// A simulated heap object
///
/// Size and references are fixed when the object is allocated. The
/// `reachable` flag is a cached classification: allocation sets it from the
/// allocation policy and every collection overwrites it with the mark result.
/// It is only valid until the next mutating call on the heap; the real answer
/// is always the root set plus the reference graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    id: ObjectId,
    size: usize,
    pub(crate) reachable: bool,
    references: Vec<ObjectId>,
}

impl MemoryObject {
    pub(crate) fn new(
        id: ObjectId,
        size: usize,
        reachable: bool,
        references: Vec<ObjectId>,
    ) -> Self {
        MemoryObject {
            id,
            size,
            reachable,
            references,
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Size in capacity units
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cached reachability, see the type docs for when it can be trusted
    #[inline]
    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Outgoing references in allocation order, duplicates included
    #[inline]
    pub fn references(&self) -> &[ObjectId] {
        &self.references
    }
}
