//! Intrusive membership lists.
//!
//! The building block the rest of the crate stands on: a doubly linked list
//! that stores its link records inside the elements it chains, reached
//! through the [`LinkAccess`] trait instead of a byte offset. See
//! [`intrusive`] for the full contract.

pub mod intrusive;
pub mod link;

pub use intrusive::{IntrusiveList, Iter, LinkAccess};
pub use link::Link;
