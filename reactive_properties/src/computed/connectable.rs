use super::inner::listen_for_dependency_updates;
use crate::{
    cell::PropertyCell,
    graph::{Subscription, ToAnySource},
    traits::{GetUntracked, Property},
};
use or_poisoned::OrPoisoned;
use std::{
    panic::Location,
    sync::{Arc, Mutex},
};

/// A property that mirrors whichever property it is currently connected to, or a fixed
/// "disconnected" value when it is connected to nothing.
///
/// Connecting, reconnecting and disconnecting fire a change event whenever the value in effect
/// actually changes.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::{computed::ConnectableProperty, stored::StoredProperty};
/// let volume = ConnectableProperty::new(0);
/// let speaker = StoredProperty::new(7);
///
/// volume.connect(speaker.clone());
/// assert_eq!(volume.get(), 7);
///
/// speaker.set(8);
/// assert_eq!(volume.get(), 8);
///
/// volume.disconnect();
/// assert_eq!(volume.get(), 0);
/// ```
pub struct ConnectableProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<ConnectableInner<T>>,
}

struct ConnectableInner<T> {
    cell: Arc<PropertyCell<T>>,
    disconnected: T,
    connection: Mutex<Connection<T>>,
}

struct Connection<T> {
    source: Option<Arc<dyn Property<T>>>,
    subscription: Option<Subscription>,
}

impl<T> ConnectableInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn source(&self) -> Option<Arc<dyn Property<T>>> {
        self.connection.lock().or_poisoned().source.clone()
    }

    fn current_value(&self) -> T {
        match self.source() {
            Some(source) => source.get_untracked(),
            None => self.disconnected.clone(),
        }
    }

    fn compute_and_notify(self: &Arc<Self>) {
        let value = self.current_value();
        self.cell.store(value);
    }

    fn set_source(self: &Arc<Self>, source: Option<Arc<dyn Property<T>>>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            connected = source.is_some(),
            "rebinding connectable property"
        );

        let previous = {
            let mut connection = self.connection.lock().or_poisoned();
            connection.source = source.clone();
            connection.subscription.take()
        };
        drop(previous);

        self.compute_and_notify();

        if let Some(source) = source {
            let subscription = listen_for_dependency_updates(
                &Arc::downgrade(self),
                &[source.to_any_source()],
                Self::compute_and_notify,
            )
            .pop();

            let mut connection = self.connection.lock().or_poisoned();
            // a concurrent connect may have replaced the source in the meantime
            let still_current = connection
                .source
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &source));
            if still_current {
                connection.subscription = subscription;
            }
        }
    }
}

impl_computed_handle!(ConnectableProperty);

impl<T> ConnectableProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a property that is not connected to anything, and so holds `disconnected`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn new(disconnected: T) -> Self {
        Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner: Arc::new(ConnectableInner {
                cell: Arc::new(PropertyCell::new(
                    disconnected.clone(),
                    T::eq,
                )),
                disconnected,
                connection: Mutex::new(Connection {
                    source: None,
                    subscription: None,
                }),
            }),
        }
    }
}

impl<T> ConnectableProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Stops mirroring the current source, if any, and mirrors `source` instead.
    pub fn connect(&self, source: impl Property<T> + 'static) {
        self.connect_shared(Arc::new(source));
    }

    /// Like [`connect`](Self::connect), for a source that is already shared.
    pub fn connect_shared(&self, source: Arc<dyn Property<T>>) {
        self.inner.set_source(Some(source));
    }

    /// Stops mirroring the current source, if any, reverting to the disconnected value.
    pub fn disconnect(&self) {
        self.inner.set_source(None);
    }

    /// Whether the property is currently connected to a source.
    pub fn is_connected(&self) -> bool {
        self.inner.source().is_some()
    }
}

impl<T> GetUntracked for ConnectableProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.current_value()
    }
}
