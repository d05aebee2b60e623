//! Arena-side types: heaps, the registry that owns them, and the
//! generational identities they issue.

pub mod arena;
pub mod error;
pub mod handle;
pub mod region;
pub mod registry;

pub use arena::{Children, Heap, HeapStats};
pub use error::RegistryError;
pub use handle::{DisposerHandle, HeapId};
pub use region::Region;
pub use registry::{HeapRegistry, Placement, RegistryStats};

pub(crate) use arena::ChildIndex;
