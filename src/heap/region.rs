//! Address ranges reported by the external memory manager.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Half-open address range `[start, start + size)` backing one heap.
///
/// The registry never allocates out of a region; it only answers containment
/// queries against it. Whoever actually carves objects out of the underlying
/// memory is responsible for handing
/// [`construct`](crate::HeapRegistry::construct) addresses inside the right
/// range.
///
/// A region whose end would pass `usize::MAX` is clamped there rather than
/// wrapped, so containment never answers through an overflowed bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    start: usize,
    size: usize,
}

impl Region {
    /// Creates a region covering `size` bytes starting at `start`.
    #[inline]
    pub const fn new(start: usize, size: usize) -> Self {
        Self { start, size }
    }

    /// First contained address.
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Size in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// One past the last contained address.
    #[inline]
    pub const fn end(&self) -> usize {
        self.start.saturating_add(self.size)
    }

    /// True when the region covers no addresses.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True when `addr` falls inside the region.
    #[inline]
    pub const fn contains(&self, addr: usize) -> bool {
        addr >= self.start && addr < self.end()
    }

    /// True when the two regions share at least one address.
    ///
    /// Empty regions overlap nothing, themselves included.
    #[inline]
    pub const fn overlaps(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end()
            && other.start < self.end()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}..{:#x}", self.start, self.end())
    }
}
