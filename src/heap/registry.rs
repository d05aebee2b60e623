//! `HeapRegistry`: the table of live arenas and the owning-arena lookup.

use core::any::Any;
use core::fmt;
use core::mem;

use serde::{Deserialize, Serialize};

use crate::dispose::{Disposable, Disposer};
use crate::heap::{ChildIndex, DisposerHandle, Heap, HeapId, Region, RegistryError};

/// One slot of the registry's heap table.
///
/// Same scheme as a heap's child table: vacant slots chain into a free list
/// and carry the generation the next occupant will be issued under.
enum HeapSlot {
    Occupied { generation: u32, heap: Heap },
    Vacant {
        generation: u32,
        next_free: Option<u32>,
    },
}

/// The table of every live arena, plus the address lookup that routes
/// freshly constructed objects to their owning heap.
///
/// The registry is the single mutation path of the whole mechanism.
/// Creating and destroying heaps, adopting objects, and disposing them all
/// funnel through `&mut self` here, which is what lets the heaps' intrusive
/// child lists stay plain data with no interior mutability or locking.
///
/// Dropping the registry tears down every remaining heap; each heap
/// finalizes its surviving children oldest first on the way out.
pub struct HeapRegistry {
    slots: Vec<HeapSlot>,
    free_head: Option<u32>,
    live: usize,
}

impl HeapRegistry {
    /// Creates a registry with no heaps.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// Creates a registry with table capacity for `capacity` heaps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
        }
    }

    /// Registers a heap spanning `region` and returns its id.
    ///
    /// # Errors
    ///
    /// Rejects empty regions, and regions that share addresses with a live
    /// heap: overlap would make [`find_containing_heap`](Self::find_containing_heap)
    /// ambiguous.
    pub fn create_heap(&mut self, region: Region) -> Result<HeapId, RegistryError> {
        if region.is_empty() {
            return Err(RegistryError::EmptyRegion { region });
        }
        if let Some((existing, _)) = self
            .heaps()
            .find(|(_, heap)| heap.region().overlaps(&region))
        {
            return Err(RegistryError::RegionOverlap { region, existing });
        }

        let id = match self.free_head {
            Some(free) => {
                let slot = &mut self.slots[free as usize];
                let (generation, next_free) = match slot {
                    HeapSlot::Vacant {
                        generation,
                        next_free,
                    } => (*generation, *next_free),
                    HeapSlot::Occupied { .. } => panic!("free list references an occupied slot"),
                };
                let id = HeapId {
                    index: free,
                    generation,
                };
                self.free_head = next_free;
                *slot = HeapSlot::Occupied {
                    generation,
                    heap: Heap::new(id, region),
                };
                id
            }
            None => {
                let id = HeapId {
                    index: self.slots.len() as u32,
                    generation: 0,
                };
                self.slots.push(HeapSlot::Occupied {
                    generation: 0,
                    heap: Heap::new(id, region),
                });
                id
            }
        };
        self.live += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(heap = %id, region = %region, "heap registered");

        Ok(id)
    }

    /// Tears down the heap behind `id`, finalizing every remaining child
    /// oldest first.
    ///
    /// Returns `false` (and does nothing) when the id is stale.
    pub fn destroy_heap(&mut self, id: HeapId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return false;
        };
        let HeapSlot::Occupied { generation, .. } = slot else {
            return false;
        };
        if *generation != id.generation {
            return false;
        }

        let vacant = HeapSlot::Vacant {
            generation: id.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let retired = mem::replace(slot, vacant);
        self.free_head = Some(id.index);
        self.live -= 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(heap = %id, "heap destroyed");

        // Dropping the retired heap runs its teardown walk.
        drop(retired);
        true
    }

    /// Live heap whose region contains `addr`, if any.
    ///
    /// A miss is an expected outcome, not an error: the address simply is
    /// not backed by any registered arena.
    pub fn find_containing_heap(&self, addr: usize) -> Option<HeapId> {
        // Linear scan. Registries hold a handful of arenas, not thousands;
        // TODO: switch to a sorted interval table if that stops being true.
        self.heaps()
            .find(|(_, heap)| heap.contains_address(addr))
            .map(|(id, _)| id)
    }

    /// Routes `value` to the heap whose region contains `at` and, if one
    /// exists, hands ownership over: the heap links the object at the tail
    /// of its child list and will finalize it at teardown unless it is
    /// disposed first.
    ///
    /// When no live region contains `at`, the value comes straight back as
    /// [`Placement::Unattached`]. Living outside arena supervision is a
    /// valid state, not an error.
    pub fn construct<T: Disposable>(&mut self, at: usize, value: T) -> Placement<T> {
        let Some(id) = self.find_containing_heap(at) else {
            return Placement::Unattached(value);
        };
        let Some(heap) = self.heap_mut(id) else {
            unreachable!("containing heap resolved to a vacant slot")
        };

        let (child, generation) = heap.adopt(Box::new(value));
        let handle = DisposerHandle {
            heap: id,
            index: child.0,
            generation,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(handle = %handle, address = at, "object adopted");

        Placement::Attached(handle)
    }

    /// Disposes the object behind `handle`: unlinks it from its heap's
    /// child list, runs its [`on_dispose`](Disposable::on_dispose) hook,
    /// and releases its slot.
    ///
    /// Returns `false` (and does nothing) when the handle is stale, which
    /// is what makes a second disposal of the same handle harmless.
    pub fn dispose(&mut self, handle: DisposerHandle) -> bool {
        let Some(heap) = self.heap_mut(handle.heap) else {
            return false;
        };
        if heap.child(handle.index, handle.generation).is_none() {
            return false;
        }

        let mut object = heap.release(ChildIndex(handle.index));
        object.on_dispose();

        #[cfg(feature = "tracing")]
        tracing::trace!(handle = %handle, "object disposed");

        true
    }

    /// Shared borrow of the object behind `handle`, `None` when stale.
    pub fn get(&self, handle: DisposerHandle) -> Option<&dyn Disposable> {
        self.heap(handle.heap)?.child(handle.index, handle.generation)
    }

    /// Exclusive borrow of the object behind `handle`, `None` when stale.
    pub fn get_mut(&mut self, handle: DisposerHandle) -> Option<&mut dyn Disposable> {
        self.heap_mut(handle.heap)?
            .child_mut(handle.index, handle.generation)
    }

    /// Shared borrow of the object behind `handle`, downcast to `T`.
    ///
    /// `None` when the handle is stale or the object is not a `T`.
    pub fn get_as<T: Disposable>(&self, handle: DisposerHandle) -> Option<&T> {
        self.get(handle)
            .and_then(|object| (object as &dyn Any).downcast_ref::<T>())
    }

    /// Exclusive borrow of the object behind `handle`, downcast to `T`.
    pub fn get_as_mut<T: Disposable>(&mut self, handle: DisposerHandle) -> Option<&mut T> {
        self.get_mut(handle)
            .and_then(|object| (object as &mut dyn Any).downcast_mut::<T>())
    }

    /// True while `handle` still resolves to a live object.
    pub fn contains(&self, handle: DisposerHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Registration state of the object behind `handle`.
    pub fn disposer(&self, handle: DisposerHandle) -> Option<&Disposer> {
        self.get(handle).map(Disposable::disposer)
    }

    /// Shared borrow of a heap, `None` when the id is stale.
    pub fn heap(&self, id: HeapId) -> Option<&Heap> {
        match self.slots.get(id.index as usize) {
            Some(HeapSlot::Occupied { generation, heap }) if *generation == id.generation => {
                Some(heap)
            }
            _ => None,
        }
    }

    fn heap_mut(&mut self, id: HeapId) -> Option<&mut Heap> {
        match self.slots.get_mut(id.index as usize) {
            Some(HeapSlot::Occupied { generation, heap }) if *generation == id.generation => {
                Some(heap)
            }
            _ => None,
        }
    }

    /// Number of live heaps.
    #[inline]
    pub fn heap_count(&self) -> usize {
        self.live
    }

    /// Iterates over every live heap with its id, in table order.
    pub fn heaps(&self) -> impl Iterator<Item = (HeapId, &Heap)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                HeapSlot::Occupied { generation, heap } => Some((
                    HeapId {
                        index: index as u32,
                        generation: *generation,
                    },
                    heap,
                )),
                HeapSlot::Vacant { .. } => None,
            })
    }

    /// Point-in-time totals across every live heap.
    pub fn stats(&self) -> RegistryStats {
        let mut children = 0;
        let mut child_slots = 0;
        for (_, heap) in self.heaps() {
            let stats = heap.stats();
            children += stats.children;
            child_slots += stats.slots;
        }
        RegistryStats {
            heaps: self.live,
            heap_slots: self.slots.len(),
            children,
            child_slots,
        }
    }
}

impl Default for HeapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeapRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapRegistry")
            .field("heaps", &self.live)
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Outcome of [`HeapRegistry::construct`].
#[derive(Debug)]
pub enum Placement<T> {
    /// The object was adopted by the heap whose region contains the
    /// requested address.
    Attached(DisposerHandle),
    /// No live region contains the requested address; the caller keeps the
    /// value, untouched.
    Unattached(T),
}

impl<T> Placement<T> {
    /// Handle of the adopted object, `None` when unattached.
    pub fn handle(&self) -> Option<DisposerHandle> {
        match self {
            Placement::Attached(handle) => Some(*handle),
            Placement::Unattached(_) => None,
        }
    }

    /// True when the object was adopted by a heap.
    pub fn is_attached(&self) -> bool {
        matches!(self, Placement::Attached(_))
    }

    /// The value back, `None` when a heap adopted it.
    pub fn into_unattached(self) -> Option<T> {
        match self {
            Placement::Attached(_) => None,
            Placement::Unattached(value) => Some(value),
        }
    }
}

/// Point-in-time totals for a whole registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Live heaps.
    pub heaps: usize,
    /// Slots in the registry table, vacant ones included.
    pub heap_slots: usize,
    /// Live supervised objects across all heaps.
    pub children: usize,
    /// Child-table slots across all heaps, vacant ones included.
    pub child_slots: usize,
}
