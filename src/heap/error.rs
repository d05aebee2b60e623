//! Errors surfaced by heap registration.
//!
//! Only registration can fail. Lookups that miss return `None`, and disposal
//! of a stale handle reports `false`; neither is an error condition, so
//! neither appears here.

use core::fmt;

use crate::heap::{HeapId, Region};

/// Why [`HeapRegistry::create_heap`](crate::HeapRegistry::create_heap)
/// refused a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested region covers no addresses, so no construction address
    /// could ever route to the heap.
    EmptyRegion {
        /// The rejected region.
        region: Region,
    },
    /// The requested region shares addresses with a live heap's region,
    /// which would make containment lookup ambiguous.
    RegionOverlap {
        /// The rejected region.
        region: Region,
        /// The live heap it collides with.
        existing: HeapId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EmptyRegion { region } => {
                write!(f, "region {region} is empty; a heap must span at least one address")
            }
            RegistryError::RegionOverlap { region, existing } => {
                write!(f, "region {region} overlaps the region of live {existing}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_region() {
        let err = RegistryError::EmptyRegion {
            region: Region::new(0x2000, 0),
        };
        assert_eq!(
            err.to_string(),
            "region 0x2000..0x2000 is empty; a heap must span at least one address"
        );

        let err = RegistryError::RegionOverlap {
            region: Region::new(0x1000, 0x100),
            existing: HeapId {
                index: 0,
                generation: 0,
            },
        };
        assert!(err.to_string().contains("overlaps"));
        assert!(err.to_string().contains("heap#0v0"));
    }
}
