//! `IntrusiveList`: a doubly linked membership structure whose links live
//! inside the elements themselves.
//!
//! The list allocates nothing and owns nothing. It records the handles of its
//! first and last members plus a member count; all remaining structure sits in
//! the members' own [`Link`] fields, reached through whatever storage owns the
//! elements. One list implementation thereby serves arbitrarily many element
//! types: the storage's [`LinkAccess`] impl plays the role a configured byte
//! offset plays in an address-based intrusive list, with the compiler checking
//! the wiring instead of a runtime constant.
//!
//! ## Contract
//!
//! Like most intrusive structures, the list trusts its caller on two points:
//!
//! - [`append`](IntrusiveList::append) requires the element to be a member of
//!   no list, since its link fields would otherwise be claimed twice;
//! - [`remove`](IntrusiveList::remove) requires the element to be a member of
//!   this exact list.
//!
//! Violations corrupt the chain. Debug builds check the cheap structural
//! consequences of each precondition and panic early; release builds trust
//! the caller and stay branch-free on the checks.
//!
//! ## Capacity
//!
//! The member count is a `u16`. Appending a 65,536th member panics in all
//! build profiles rather than letting the counter wrap and silently desync
//! from the chain.

use crate::list::Link;

/// Storage-side resolver from an element handle to the [`Link`] embedded in
/// that element.
///
/// Implemented by whatever owns the elements: a slot table, a `Vec`, an
/// arena. The list calls these for every structural update, so the element
/// behind a given handle must keep answering to that handle for as long as it
/// is linked.
pub trait LinkAccess<H: Copy> {
    /// Shared access to the link embedded in `node`.
    fn link_of(&self, node: H) -> &Link<H>;

    /// Exclusive access to the link embedded in `node`.
    fn link_of_mut(&mut self, node: H) -> &mut Link<H>;
}

/// A doubly linked list of handles whose link records are element-resident.
///
/// The list is three words of bookkeeping: head handle, tail handle, member
/// count. Every operation takes the element storage as an explicit argument,
/// which keeps the list itself `Copy`-cheap to embed and makes the borrow
/// story explicit at each call site.
#[derive(Debug)]
pub struct IntrusiveList<H> {
    head: Option<H>,
    tail: Option<H>,
    num_objects: u16,
}

impl<H> IntrusiveList<H> {
    /// Creates an empty list.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            num_objects: 0,
        }
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        usize::from(self.num_objects)
    }

    /// True when the list has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_objects == 0
    }
}

impl<H: Copy + PartialEq> IntrusiveList<H> {
    /// Handle of the first member, if any.
    #[inline]
    pub fn head(&self) -> Option<H> {
        self.head
    }

    /// Handle of the last member, if any.
    #[inline]
    pub fn tail(&self) -> Option<H> {
        self.tail
    }

    /// Appends `node` at the tail.
    ///
    /// `node` must not currently be a member of any list. Debug builds panic
    /// when the element still carries link state or already sits at the head;
    /// release builds trust the caller.
    ///
    /// # Panics
    ///
    /// Panics in all build profiles when the list already holds
    /// `u16::MAX` members.
    pub fn append<S>(&mut self, store: &mut S, node: H)
    where
        S: LinkAccess<H> + ?Sized,
    {
        assert!(
            self.num_objects < u16::MAX,
            "intrusive list member count would overflow u16"
        );
        debug_assert!(
            store.link_of(node).is_clear(),
            "appended element already carries link state"
        );
        debug_assert!(
            self.head.map_or(true, |head| head != node),
            "appended element is already the head of this list"
        );

        let old_tail = self.tail;
        {
            let link = store.link_of_mut(node);
            link.prev = old_tail;
            link.next = None;
        }
        match old_tail {
            Some(tail) => store.link_of_mut(tail).next = Some(node),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
        self.num_objects += 1;
    }

    /// Unlinks `node`, splicing its neighbors together and clearing the
    /// element's own link fields.
    ///
    /// `node` must currently be a member of this list. Debug builds panic on
    /// the detectable violations (empty list, an element whose link state is
    /// inconsistent with this list's endpoints); release builds trust the
    /// caller.
    pub fn remove<S>(&mut self, store: &mut S, node: H)
    where
        S: LinkAccess<H> + ?Sized,
    {
        debug_assert!(self.num_objects > 0, "remove from an empty list");
        let Link { prev, next } = *store.link_of(node);
        debug_assert!(
            prev.is_some() || self.head.map_or(false, |head| head == node),
            "removed element is not a member of this list"
        );
        debug_assert!(
            next.is_some() || self.tail.map_or(false, |tail| tail == node),
            "removed element is not a member of this list"
        );

        match prev {
            Some(prev) => store.link_of_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => store.link_of_mut(next).prev = prev,
            None => self.tail = prev,
        }
        store.link_of_mut(node).clear();
        self.num_objects -= 1;
    }

    /// Handle of the member after `node`, if any.
    ///
    /// `node` must be a member of this list. Traversal code that removes
    /// members as it walks should fetch the successor *before* unlinking the
    /// current member, since unlinking clears the member's own fields.
    #[inline]
    pub fn next_of<S>(&self, store: &S, node: H) -> Option<H>
    where
        S: LinkAccess<H> + ?Sized,
    {
        debug_assert!(self.num_objects > 0, "traversal of an empty list");
        store.link_of(node).next
    }

    /// Handle of the member before `node`, if any.
    ///
    /// `node` must be a member of this list.
    #[inline]
    pub fn prev_of<S>(&self, store: &S, node: H) -> Option<H>
    where
        S: LinkAccess<H> + ?Sized,
    {
        debug_assert!(self.num_objects > 0, "traversal of an empty list");
        store.link_of(node).prev
    }

    /// Iterates over member handles from head to tail.
    ///
    /// The iterator is double ended and exact sized; reversing it walks tail
    /// to head over the same members.
    pub fn iter<'a, S>(&self, store: &'a S) -> Iter<'a, H, S>
    where
        S: LinkAccess<H> + ?Sized,
    {
        Iter {
            store,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }
}

impl<H> Default for IntrusiveList<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Double-ended iterator over the member handles of an [`IntrusiveList`].
///
/// Yields handles, not element references, so the caller decides how to
/// resolve each one against the storage it already holds.
pub struct Iter<'a, H, S: ?Sized> {
    store: &'a S,
    front: Option<H>,
    back: Option<H>,
    remaining: usize,
}

impl<H: Copy + PartialEq, S: LinkAccess<H> + ?Sized> Iterator for Iter<'_, H, S> {
    type Item = H;

    fn next(&mut self) -> Option<H> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front?;
        self.remaining -= 1;
        // Once the two cursors have met, stop without touching links again.
        self.front = if self.remaining == 0 {
            None
        } else {
            self.store.link_of(node).next
        };
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<H: Copy + PartialEq, S: LinkAccess<H> + ?Sized> DoubleEndedIterator for Iter<'_, H, S> {
    fn next_back(&mut self) -> Option<H> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back?;
        self.remaining -= 1;
        self.back = if self.remaining == 0 {
            None
        } else {
            self.store.link_of(node).prev
        };
        Some(node)
    }
}

impl<H: Copy + PartialEq, S: LinkAccess<H> + ?Sized> ExactSizeIterator for Iter<'_, H, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}
