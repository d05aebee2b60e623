//! `Heap`: one arena's ownership-tracking view.

use core::fmt;
use core::mem;

use serde::{Deserialize, Serialize};

use crate::dispose::Disposable;
use crate::heap::{DisposerHandle, HeapId, Region};
use crate::list::{IntrusiveList, Iter, Link, LinkAccess};

/// Position of a child slot inside one heap's table.
///
/// This is the handle type the child list is linked with. Purely internal:
/// public code sees [`DisposerHandle`], which adds the owning heap id and a
/// generation on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChildIndex(pub(crate) u32);

/// One slot of a heap's child table.
///
/// Vacant slots chain into a free list. The generation bumps when a slot is
/// vacated, so handles issued against the old occupant stop resolving the
/// moment it leaves.
enum ChildSlot {
    Occupied {
        generation: u32,
        object: Box<dyn Disposable>,
    },
    Vacant {
        generation: u32,
        next_free: Option<u32>,
    },
}

impl ChildSlot {
    fn generation(&self) -> u32 {
        match self {
            ChildSlot::Occupied { generation, .. } | ChildSlot::Vacant { generation, .. } => {
                *generation
            }
        }
    }
}

impl LinkAccess<ChildIndex> for [ChildSlot] {
    fn link_of(&self, node: ChildIndex) -> &Link<ChildIndex> {
        match &self[node.0 as usize] {
            ChildSlot::Occupied { object, .. } => object.disposer().link(),
            ChildSlot::Vacant { .. } => panic!("child list references a vacant slot"),
        }
    }

    fn link_of_mut(&mut self, node: ChildIndex) -> &mut Link<ChildIndex> {
        match &mut self[node.0 as usize] {
            ChildSlot::Occupied { object, .. } => object.disposer_mut().link_mut(),
            ChildSlot::Vacant { .. } => panic!("child list references a vacant slot"),
        }
    }
}

/// One arena's ownership-tracking view: the set of live objects carved from
/// its region, kept in construction order.
///
/// A heap does not manage raw memory. It supervises *objects*: a slot table
/// owns each adopted [`Disposable`], and an intrusive child list threaded
/// through the objects' own [`Disposer`](crate::Disposer) fields records
/// membership and age order. Whoever is still in that list when the heap
/// goes away gets finalized by the heap, oldest first.
///
/// All mutation flows through [`HeapRegistry`](crate::HeapRegistry); the
/// methods here are the read side.
pub struct Heap {
    id: HeapId,
    region: Region,
    slots: Vec<ChildSlot>,
    free_head: Option<u32>,
    children: IntrusiveList<ChildIndex>,
}

impl Heap {
    pub(crate) fn new(id: HeapId, region: Region) -> Self {
        Self {
            id,
            region,
            slots: Vec::new(),
            free_head: None,
            children: IntrusiveList::new(),
        }
    }

    /// Id this heap is registered under.
    #[inline]
    pub fn id(&self) -> HeapId {
        self.id
    }

    /// Address range this heap spans.
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// True when `addr` falls inside this heap's region.
    #[inline]
    pub fn contains_address(&self, addr: usize) -> bool {
        self.region.contains(addr)
    }

    /// Number of objects currently supervised.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// True when no objects are supervised.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Point-in-time usage numbers.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            region: self.region,
            children: self.children.len(),
            slots: self.slots.len(),
        }
    }

    /// Iterates over live children in construction order, oldest first.
    pub fn children(&self) -> Children<'_> {
        Children {
            heap: self,
            inner: self.children.iter(&self.slots[..]),
        }
    }

    /// Resolves a child by table position, `None` on generation mismatch.
    pub(crate) fn child(&self, index: u32, generation: u32) -> Option<&dyn Disposable> {
        match self.slots.get(index as usize) {
            Some(ChildSlot::Occupied {
                generation: current,
                object,
            }) if *current == generation => Some(object.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, index: u32, generation: u32) -> Option<&mut dyn Disposable> {
        match self.slots.get_mut(index as usize) {
            Some(ChildSlot::Occupied {
                generation: current,
                object,
            }) if *current == generation => Some(object.as_mut()),
            _ => None,
        }
    }

    /// Takes ownership of `object` and links it at the tail of the child
    /// list. Returns the slot position and the generation the slot was
    /// occupied under.
    pub(crate) fn adopt(&mut self, mut object: Box<dyn Disposable>) -> (ChildIndex, u32) {
        object.disposer_mut().attach(self.id);

        let (child, generation) = match self.free_head {
            Some(free) => {
                let slot = &mut self.slots[free as usize];
                let (generation, next_free) = match slot {
                    ChildSlot::Vacant {
                        generation,
                        next_free,
                    } => (*generation, *next_free),
                    ChildSlot::Occupied { .. } => panic!("free list references an occupied slot"),
                };
                self.free_head = next_free;
                *slot = ChildSlot::Occupied { generation, object };
                (ChildIndex(free), generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(ChildSlot::Occupied {
                    generation: 0,
                    object,
                });
                (ChildIndex(index), 0)
            }
        };

        self.append_disposer(child);
        (child, generation)
    }

    /// Unlinks `child` and vacates its slot, handing back the owned object
    /// with its registration state reset. The slot generation bumps so
    /// outstanding handles go stale.
    pub(crate) fn release(&mut self, child: ChildIndex) -> Box<dyn Disposable> {
        self.remove_disposer(child);

        let slot = &mut self.slots[child.0 as usize];
        let vacant = ChildSlot::Vacant {
            generation: slot.generation().wrapping_add(1),
            next_free: self.free_head,
        };
        match mem::replace(slot, vacant) {
            ChildSlot::Occupied { mut object, .. } => {
                self.free_head = Some(child.0);
                object.disposer_mut().detach();
                object
            }
            ChildSlot::Vacant { .. } => panic!("released child is vacant"),
        }
    }

    /// Links `child` at the tail of the child list.
    pub(crate) fn append_disposer(&mut self, child: ChildIndex) {
        self.children.append(&mut self.slots[..], child);
    }

    /// Unlinks `child` from the child list.
    pub(crate) fn remove_disposer(&mut self, child: ChildIndex) {
        self.children.remove(&mut self.slots[..], child);
    }

    /// Finalizes and drops every remaining child, oldest first.
    pub(crate) fn dispose_all(&mut self) {
        #[cfg(feature = "tracing")]
        if !self.children.is_empty() {
            tracing::debug!(heap = %self.id, survivors = self.children.len(), "heap teardown");
        }

        let mut cursor = self.children.head();
        while let Some(child) = cursor {
            // Disposal unlinks the current member, so capture its successor
            // before touching it.
            cursor = self.children.next_of(&self.slots[..], child);
            let mut object = self.release(child);
            object.on_dispose();

            #[cfg(feature = "tracing")]
            tracing::trace!(heap = %self.id, child = child.0, "object finalized in teardown");
        }
    }
}

impl Drop for Heap {
    /// Teardown is the drop path: every surviving child is finalized in
    /// construction order before the heap's own storage goes.
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("id", &self.id)
            .field("region", &self.region)
            .field("children", &self.children.len())
            .field("slots", &self.slots.len())
            .finish()
    }
}

/// Point-in-time usage numbers for one heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStats {
    /// Address range the heap spans.
    pub region: Region,
    /// Live supervised objects.
    pub children: usize,
    /// Slots allocated in the child table, vacant ones included.
    pub slots: usize,
}

/// Iterator over a heap's live children, oldest first.
///
/// Yields each child's handle alongside a shared borrow of the object.
/// Double ended: reversing walks newest first.
pub struct Children<'a> {
    heap: &'a Heap,
    inner: Iter<'a, ChildIndex, [ChildSlot]>,
}

impl<'a> Children<'a> {
    fn resolve(&self, child: ChildIndex) -> (DisposerHandle, &'a dyn Disposable) {
        match &self.heap.slots[child.0 as usize] {
            ChildSlot::Occupied { generation, object } => (
                DisposerHandle {
                    heap: self.heap.id,
                    index: child.0,
                    generation: *generation,
                },
                object.as_ref(),
            ),
            ChildSlot::Vacant { .. } => panic!("child list references a vacant slot"),
        }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = (DisposerHandle, &'a dyn Disposable);

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.inner.next()?;
        Some(self.resolve(child))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let child = self.inner.next_back()?;
        Some(self.resolve(child))
    }
}

impl ExactSizeIterator for Children<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}
