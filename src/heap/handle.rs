//! Generational identities for heaps and the objects they supervise.
//!
//! Both id types here are plain data: eight and sixteen bytes, freely
//! copyable and serializable, owning nothing. Staleness is detected by
//! generation mismatch, so using an id after its target is gone degenerates
//! into a lookup miss instead of undefined behavior. This is the same scheme
//! slot maps and generational arenas use for dangling-key safety.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a heap registered in a [`HeapRegistry`](crate::HeapRegistry).
///
/// Destroying the heap retires the id; a retired id never resolves again,
/// even after the registry reuses its slot for a new heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct HeapId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl HeapId {
    /// Slot index inside the registry table.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation the id was issued under.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heap#{}v{}", self.index, self.generation)
    }
}

/// Identity of one supervised object inside one heap.
///
/// Returned by [`HeapRegistry::construct`](crate::HeapRegistry::construct)
/// when an object is adopted. The handle is non-owning: dropping it changes
/// nothing, and the heap finalizes the object at teardown whether or not
/// anyone still holds its handle. After the object is disposed, the handle
/// goes stale and every registry operation taking it turns into a no-op or a
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub struct DisposerHandle {
    pub(crate) heap: HeapId,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl DisposerHandle {
    /// Id of the heap that adopted the object.
    #[inline]
    pub fn heap(&self) -> HeapId {
        self.heap
    }

    /// Slot index inside the owning heap's child table.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation the handle was issued under.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for DisposerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/child#{}v{}", self.heap, self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_compact_and_stable() {
        let heap = HeapId {
            index: 3,
            generation: 1,
        };
        let handle = DisposerHandle {
            heap,
            index: 12,
            generation: 4,
        };
        assert_eq!(heap.to_string(), "heap#3v1");
        assert_eq!(handle.to_string(), "heap#3v1/child#12v4");
    }

    #[test]
    fn test_ids_round_trip_through_serde() {
        let heap = HeapId {
            index: 7,
            generation: 2,
        };
        let json = serde_json::to_string(&heap).unwrap();
        let back: HeapId = serde_json::from_str(&json).unwrap();
        assert_eq!(heap, back);
    }
}
