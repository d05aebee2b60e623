//! Object-side types: what a supervised value embeds and implements.

pub mod disposable;
pub mod disposer;

pub use disposable::Disposable;
pub use disposer::Disposer;
