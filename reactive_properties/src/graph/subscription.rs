use super::AnySource;
use core::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identifies a single listener registered with a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Keeps a listener registered with a property.
///
/// The listener is removed when this handle is dropped or [`unsubscribe`](Self::unsubscribe)d.
/// A `Subscription` only holds a weak reference to the property it came from, so holding one
/// does not keep that property alive.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::stored::StoredProperty;
/// # use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// let count = StoredProperty::new(0);
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let subscription = count.subscribe({
///     let seen = Arc::clone(&seen);
///     move |_| {
///         seen.fetch_add(1, Ordering::Relaxed);
///     }
/// });
/// count.set(1);
/// subscription.unsubscribe();
/// count.set(2);
///
/// assert_eq!(seen.load(Ordering::Relaxed), 1);
/// ```
#[must_use = "dropping a Subscription immediately removes its listener"]
pub struct Subscription {
    source: AnySource,
    id: SubscriptionId,
    detached: bool,
}

impl Subscription {
    pub(crate) fn new(source: AnySource, id: SubscriptionId) -> Self {
        Self {
            source,
            id,
            detached: false,
        }
    }

    /// The identifier of the registered listener.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The property this listener is registered with.
    pub fn source(&self) -> &AnySource {
        &self.source
    }

    /// Removes the listener from the property.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Leaves the listener registered for as long as the property exists.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.source.remove_listener(self.id);
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("source", &self.source)
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish()
    }
}
