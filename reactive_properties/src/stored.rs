//! Leaf properties, whose values are set directly rather than computed.

mod atomic;
mod stored_property;

pub use atomic::DEFAULT_TOLERANCE;
pub use stored_property::*;
