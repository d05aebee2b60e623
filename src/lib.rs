//! # `tether` - Arena Ownership Tracking
//!
//! A small toolkit for tracking which arena owns which object, built around
//! an intrusive doubly linked list whose link records live inside the
//! tracked objects themselves.
//!
//! ## The model
//!
//! An external memory manager hands out address regions; this crate keeps
//! the ownership ledger for them:
//!
//! 1. **Heaps** ([`Heap`]): one per arena region. Each heap supervises the
//!    objects constructed inside its region, in construction order, via an
//!    intrusive child list.
//! 2. **Disposers** ([`Disposer`]): the registration state every supervised
//!    object embeds. A disposer records the owning heap (by generational id,
//!    never a borrow) and carries the link the child list threads through.
//! 3. **The registry** ([`HeapRegistry`]): the single mutation path. It
//!    routes each freshly constructed object to the heap whose region
//!    contains its address, resolves handles, and tears heaps down.
//!
//! The payoff is deterministic cleanup: destroying a heap (or dropping the
//! registry) finalizes every object the heap still supervises, oldest
//! first, through [`Disposable::on_dispose`]. Objects disposed early leave
//! their heap's list at that moment and are not finalized again.
//!
//! ## Safety model
//!
//! The classic intrusive-list design keys everything off object addresses
//! and embedded pointers. Here the same topology is expressed in safe Rust:
//!
//! - Links name their neighbors by **handle**, resolved through the
//!   [`LinkAccess`](list::LinkAccess) storage trait, so there is no pointer
//!   to invalidate and no offset arithmetic to get wrong.
//! - Heap ids and child handles are **generational**. A stale id or handle
//!   degrades into a lookup miss or a no-op, never a dangling access.
//! - Ownership is unambiguous: the heap's slot table owns each adopted
//!   object as a `Box<dyn Disposable>`. Deregistration is fused into the
//!   only paths that can remove an object, so it cannot be forgotten.
//!
//! ## Example
//!
//! ```rust
//! use tether::{Disposable, Disposer, HeapRegistry, Region};
//!
//! struct Texture {
//!     disposer: Disposer,
//!     id: u32,
//! }
//!
//! impl Disposable for Texture {
//!     fn disposer(&self) -> &Disposer {
//!         &self.disposer
//!     }
//!     fn disposer_mut(&mut self) -> &mut Disposer {
//!         &mut self.disposer
//!     }
//! }
//!
//! let mut registry = HeapRegistry::new();
//! let heap = registry.create_heap(Region::new(0x1000, 0x1000)).unwrap();
//!
//! // The address decides the owning heap.
//! let placement = registry.construct(0x1400, Texture {
//!     disposer: Disposer::new(),
//!     id: 7,
//! });
//! let handle = placement.handle().unwrap();
//!
//! assert_eq!(registry.heap(heap).unwrap().child_count(), 1);
//! assert_eq!(registry.get_as::<Texture>(handle).unwrap().id, 7);
//!
//! assert!(registry.dispose(handle));
//! assert!(!registry.dispose(handle)); // second disposal is a no-op
//! ```
//!
//! ## Feature flags
//!
//! - `tracing`: emit [`tracing`](https://docs.rs/tracing) events for heap
//!   registration, teardown, adoption, and disposal. Off by default.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod dispose;
pub mod heap;
pub mod list;

pub use dispose::{Disposable, Disposer};
pub use heap::{
    Children, DisposerHandle, Heap, HeapId, HeapRegistry, HeapStats, Placement, Region,
    RegistryError, RegistryStats,
};
pub use list::{IntrusiveList, Link, LinkAccess};

// Compile-time layout checks for the types that get embedded everywhere.
const _: () = {
    use core::mem;

    use crate::heap::ChildIndex;

    // Ids are plain data with a fixed wire-friendly size.
    assert!(mem::size_of::<HeapId>() == 8);
    assert!(mem::size_of::<DisposerHandle>() == 16);

    // Every supervised object carries a `Disposer`, and every heap embeds a
    // list header, so both should stay small. Everything inside is u32
    // based, so the bounds hold on any platform; they are loose rather than
    // exact to leave the niche layout to the compiler while still catching
    // accidental growth.
    assert!(mem::size_of::<Link<ChildIndex>>() <= 16);
    assert!(mem::size_of::<Disposer>() <= 32);
    assert!(mem::size_of::<IntrusiveList<ChildIndex>>() <= 24);
};
