//! `Disposable`: the capability trait a heap can supervise.

use core::any::Any;

use crate::dispose::Disposer;

/// Implemented by every type an arena heap can track.
///
/// Implementors embed a [`Disposer`] and surface it through the two
/// accessors; all registration and deregistration runs through those inside
/// the registry, never in user code. [`on_dispose`](Disposable::on_dispose)
/// is the finalization hook: it runs exactly once, after the object has been
/// unlinked from its heap's child list and immediately before its storage is
/// released, whether disposal was requested for the one object or triggered
/// by heap teardown. Deregistration itself is not the hook's job and cannot
/// be skipped by forgetting a call.
///
/// The `Any` supertrait is what lets a registry full of heterogeneous
/// children hand back concrete types again, via
/// [`HeapRegistry::get_as`](crate::HeapRegistry::get_as). It also imposes
/// `'static`: a supervised object may not borrow from its surroundings,
/// which is exactly the property that makes deferred teardown sound.
///
/// # Example
///
/// ```
/// use tether::{Disposable, Disposer};
///
/// struct Texture {
///     disposer: Disposer,
///     bytes: usize,
/// }
///
/// impl Disposable for Texture {
///     fn disposer(&self) -> &Disposer {
///         &self.disposer
///     }
///
///     fn disposer_mut(&mut self) -> &mut Disposer {
///         &mut self.disposer
///     }
///
///     fn on_dispose(&mut self) {
///         self.bytes = 0;
///     }
/// }
/// ```
pub trait Disposable: Any {
    /// Shared access to the embedded registration state.
    fn disposer(&self) -> &Disposer;

    /// Exclusive access to the embedded registration state.
    fn disposer_mut(&mut self) -> &mut Disposer;

    /// Finalization hook for the concrete type's own resources.
    ///
    /// Runs with the object already detached from its heap. The default does
    /// nothing.
    fn on_dispose(&mut self) {}
}
