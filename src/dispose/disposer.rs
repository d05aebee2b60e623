//! `Disposer`: the registration state a supervised object embeds.

use crate::heap::{ChildIndex, HeapId};
use crate::list::Link;

/// Per-object registration state: an owning-heap back-reference plus the
/// embedded link that heap's child list threads through.
///
/// A disposer is either **unattached** (no owning heap, the resting state of
/// any freestanding value) or **attached** (linked into exactly one heap's
/// child list). Values become attached only by being adopted through
/// [`HeapRegistry::construct`](crate::HeapRegistry::construct); they return
/// to unattached when disposed or when their heap is torn down. Both
/// transitions run inside the registry, so an object can never be left
/// half-registered.
///
/// The back-reference is a generational [`HeapId`], not a borrow: a disposer
/// never keeps its heap alive, and after the heap is destroyed the stored id
/// simply stops resolving instead of dangling.
#[derive(Debug)]
pub struct Disposer {
    heap: Option<HeapId>,
    link: Link<ChildIndex>,
}

impl Disposer {
    /// Creates an unattached disposer.
    #[inline]
    pub const fn new() -> Self {
        Self {
            heap: None,
            link: Link::new(),
        }
    }

    /// Id of the owning heap, or `None` while unattached.
    #[inline]
    pub fn owning_heap(&self) -> Option<HeapId> {
        self.heap
    }

    /// True while the object sits in some heap's child list.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.heap.is_some()
    }

    pub(crate) fn attach(&mut self, heap: HeapId) {
        debug_assert!(self.heap.is_none(), "disposer is already attached");
        self.heap = Some(heap);
    }

    pub(crate) fn detach(&mut self) {
        debug_assert!(
            self.link.is_clear(),
            "disposer detached while still linked"
        );
        self.heap = None;
    }

    #[inline]
    pub(crate) fn link(&self) -> &Link<ChildIndex> {
        &self.link
    }

    #[inline]
    pub(crate) fn link_mut(&mut self) -> &mut Link<ChildIndex> {
        &mut self.link
    }
}

impl Default for Disposer {
    fn default() -> Self {
        Self::new()
    }
}
