//! The per-element link record that intrusive lists thread through.

/// Neighbor references embedded in every list member.
///
/// A `Link` names neighboring *elements* by handle, not neighboring link
/// records: the list resolves a member's link through
/// [`LinkAccess`](crate::list::LinkAccess) every time it needs one, so the
/// storage keeps sole ownership of its elements and may relocate them
/// freely between calls.
///
/// A cleared link (both fields `None`) is the resting state of an element
/// that belongs to no list. [`IntrusiveList::remove`](crate::list::IntrusiveList::remove)
/// restores that state on the way out, so a removed element can be appended
/// again without any manual reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<H> {
    pub(crate) prev: Option<H>,
    pub(crate) next: Option<H>,
}

impl<H: Copy> Link<H> {
    /// Creates a link in the cleared state.
    #[inline]
    pub const fn new() -> Self {
        Self {
            prev: None,
            next: None,
        }
    }

    /// Handle of the previous member, if any.
    #[inline]
    pub fn prev(&self) -> Option<H> {
        self.prev
    }

    /// Handle of the next member, if any.
    #[inline]
    pub fn next(&self) -> Option<H> {
        self.next
    }

    /// True when both neighbor fields are `None`.
    ///
    /// Note the one ambiguity: the sole member of a singleton list also has
    /// both fields clear. Membership itself is the list's knowledge, not the
    /// link's.
    #[inline]
    pub fn is_clear(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.prev = None;
        self.next = None;
    }
}

impl<H: Copy> Default for Link<H> {
    fn default() -> Self {
        Self::new()
    }
}
