//! The plumbing shared by every property: type-erased handles to properties, the ordered sets
//! of listeners each property notifies, the handles that keep those listeners registered, and
//! the thread-local observer that records reads during a tracked evaluation.

mod listeners;
mod observer;
mod source;
mod subscription;

pub(crate) use listeners::*;
pub use observer::*;
pub use source::*;
pub use subscription::*;
