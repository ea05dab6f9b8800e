//! Push-based observable properties whose values derive from one another.
//!
//! A property is a single-valued container that tells its listeners the old and new value every
//! time its value actually changes. Properties come in two families:
//! 1. **Stored properties**: leaf values, which can be set directly.
//! 2. **Computed properties**: values produced by a function of other properties, which update
//!    whenever a property they depend on changes.
//!
//! Changes are pushed, synchronously. Setting a stored property recomputes every property that
//! transitively depends on it, and delivers every resulting change event, before `set` returns.
//! There is no scheduler and no batching: propagation is just a chain of function calls on the
//! thread that made the change.
//!
//! ```rust
//! use reactive_properties::{
//!     computed::DerivedProperty, prelude::*, stored::StoredProperty,
//! };
//! use std::sync::{Arc, Mutex};
//!
//! let x = StoredProperty::new(8);
//! let abs = DerivedProperty::map(x.clone(), |x: i32| x.abs());
//! assert_eq!(abs.get(), 8);
//!
//! let events = Arc::new(Mutex::new(Vec::new()));
//! let _subscription = abs.subscribe({
//!     let events = Arc::clone(&events);
//!     move |event| events.lock().unwrap().push((event.old, event.new))
//! });
//!
//! x.set(-9);
//! assert_eq!(abs.get(), 9);
//! assert_eq!(*events.lock().unwrap(), vec![(8, 9)]);
//!
//! // an equal result is not a change
//! x.set(9);
//! assert_eq!(events.lock().unwrap().len(), 1);
//! ```
//!
//! ## Design Principles and Assumptions
//! - **Events mean change.** A change event is fired if and only if the new value differs from
//!   the old one, using the property's notion of equality (`PartialEq` by default).
//! - **Compute outside, compare inside.** A computed property runs its function without holding
//!   any lock, then compares and stores the result under its own lock, then notifies with the
//!   lock released. Listeners may therefore read and subscribe to any property, including the
//!   one notifying them.
//! - **Dependents own their edges.** A computed property holds the
//!   [`Subscription`](graph::Subscription)s to its dependencies, and those dependencies only
//!   hold a weak reference back. Dropping the last handle to a computed property unsubscribes it
//!   from everything.
//! - **No glitch protection.** A property reachable along two paths from one change may be
//!   recomputed twice, observing an intermediate state in between.

#![deny(missing_docs)]

use std::fmt::Arguments;

mod cell;
pub mod computed;
pub mod context;
pub mod error;
pub mod event;
pub mod graph;
#[cfg(feature = "serde")]
mod serde;
pub mod stored;
pub mod traits;

/// Reexports frequently-used traits.
pub mod prelude {
    pub use crate::traits::*;
}

#[doc(hidden)]
pub fn log_warning(text: Arguments) {
    #[cfg(feature = "tracing")]
    {
        tracing::warn!(text);
    }
    #[cfg(not(feature = "tracing"))]
    {
        eprintln!("{text}");
    }
}
