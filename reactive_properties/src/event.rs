//! The message every property delivers to its listeners when its value changes.

use std::sync::Arc;

/// The previous and current value of a property, delivered to listeners when (and only when)
/// the two differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEvent<T> {
    /// The value before the change.
    pub old: T,
    /// The value after the change.
    pub new: T,
}

impl<T> ChangeEvent<T> {
    /// Every property exposes a single value, so every event concerns the same slot.
    pub const PROPERTY_NAME: &'static str = "value";

    /// Creates an event describing a change from `old` to `new`.
    pub fn new(old: T, new: T) -> Self {
        Self { old, new }
    }

    /// The name of the slot that changed, which is always [`Self::PROPERTY_NAME`].
    pub fn property_name(&self) -> &'static str {
        Self::PROPERTY_NAME
    }
}

/// A typed change listener, shared between the property and anyone who registered it.
pub type Listener<T> = Arc<dyn Fn(&ChangeEvent<T>) + Send + Sync>;
