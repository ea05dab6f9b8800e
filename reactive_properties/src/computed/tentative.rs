use crate::{
    cell::{release_before_unwind, PropertyCell},
    error::PropertyError,
    graph::{Subscription, ToAnySource},
    traits::{GetUntracked, Property, Set},
};
use futures::future::{AbortHandle, Abortable};
use or_poisoned::OrPoisoned;
use std::{
    panic::Location,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};
use tokio::runtime::Handle;

/// A property that mirrors a parent property, but can be overridden with a value that reverts
/// to the parent's value after a fixed duration.
///
/// While an override is in effect, changes to the parent are ignored. Setting another value
/// restarts the countdown, so repeatedly setting the property prolongs the override
/// indefinitely. When the countdown elapses, the property takes the parent's *current* value.
///
/// Reverts are scheduled on the tokio runtime the property was created in.
///
/// ```
/// # use reactive_properties::prelude::*;
/// # use reactive_properties::{computed::TentativeProperty, stored::StoredProperty};
/// # use std::time::Duration;
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let saved = StoredProperty::new(50);
/// let slider = TentativeProperty::new(saved.clone(), Duration::from_secs(2)).unwrap();
///
/// // the user drags the slider
/// slider.set(60);
/// saved.set(55);
/// assert_eq!(slider.get(), 60);
///
/// tokio::time::sleep(Duration::from_secs(3)).await;
/// assert_eq!(slider.get(), 55);
/// # }
/// ```
pub struct TentativeProperty<T> {
    #[cfg(debug_assertions)]
    defined_at: &'static Location<'static>,
    inner: Arc<TentativeInner<T>>,
}

struct TentativeInner<T> {
    cell: Arc<PropertyCell<T>>,
    parent: Arc<dyn Property<T>>,
    duration: Duration,
    runtime: Handle,
    /// Guards every read-compare-write of the effective value, and the pending revert with it.
    pending: Mutex<PendingRevert>,
    _parent: Subscription,
}

#[derive(Default)]
struct PendingRevert {
    generation: u64,
    revert: Option<AbortHandle>,
}

impl PendingRevert {
    fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.revert.take() {
            Some(revert) => {
                revert.abort();
                true
            }
            None => false,
        }
    }
}

impl<T> TentativeInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn with_pending<U>(
        &self,
        fun: impl FnOnce(&mut PendingRevert) -> U,
    ) -> U {
        release_before_unwind(self.pending.lock().or_poisoned(), fun)
    }

    fn follow_parent(self: &Arc<Self>) {
        let event = self.with_pending(|pending| {
            if pending.revert.is_some() {
                return None;
            }
            self.cell.replace(self.parent.get_untracked())
        });
        if let Some(event) = event {
            self.cell.notify(event);
        }
    }

    fn override_with(self: &Arc<Self>, value: T) {
        let event = self.with_pending(|pending| {
            pending.cancel();
            let generation = pending.generation;

            let (handle, registration) = AbortHandle::new_pair();
            let node = Arc::downgrade(self);
            let duration = self.duration;
            _ = self.runtime.spawn(Abortable::new(
                async move {
                    tokio::time::sleep(duration).await;
                    if let Some(node) = node.upgrade() {
                        node.revert(generation);
                    }
                },
                registration,
            ));
            pending.revert = Some(handle);

            #[cfg(feature = "tracing")]
            tracing::trace!(
                ?duration,
                generation,
                "tentative override scheduled"
            );

            self.cell.replace(value)
        });
        if let Some(event) = event {
            self.cell.notify(event);
        }
    }

    fn revert(&self, generation: u64) {
        let event = self.with_pending(|pending| {
            if pending.generation != generation || pending.revert.is_none() {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    generation,
                    "stale tentative revert suppressed"
                );
                return None;
            }
            pending.revert = None;

            #[cfg(feature = "tracing")]
            tracing::trace!(generation, "tentative override expired");

            self.cell.replace(self.parent.get_untracked())
        });
        if let Some(event) = event {
            self.cell.notify(event);
        }
    }

    fn dispose(&self) {
        if self.pending.lock().or_poisoned().cancel() {
            #[cfg(feature = "tracing")]
            tracing::debug!("pending tentative revert cancelled");
        }
    }
}

impl<T> Drop for TentativeInner<T> {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            if let Some(revert) = pending.revert.take() {
                revert.abort();
            }
        }
    }
}

impl_computed_handle!(TentativeProperty);

impl<T> TentativeProperty<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a property that mirrors `parent`, where values set on it revert to the parent's
    /// value after `duration`.
    ///
    /// Must be called within a tokio runtime, which will run the reverts. Fails if there is none,
    /// or if `duration` is zero.
    #[track_caller]
    pub fn new(
        parent: impl Property<T> + 'static,
        duration: Duration,
    ) -> Result<Self, PropertyError> {
        let runtime =
            Handle::try_current().map_err(|_| PropertyError::NoRuntime)?;
        Self::with_runtime(parent, duration, runtime)
    }

    /// Like [`new`](Self::new), scheduling reverts on `runtime` instead of the current runtime.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "trace", skip_all)
    )]
    #[track_caller]
    pub fn with_runtime(
        parent: impl Property<T> + 'static,
        duration: Duration,
        runtime: Handle,
    ) -> Result<Self, PropertyError> {
        if duration.is_zero() {
            return Err(PropertyError::ZeroDuration);
        }

        let parent: Arc<dyn Property<T>> = Arc::new(parent);
        let parent_source = parent.to_any_source();
        let value = parent.get_untracked();
        let inner = Arc::new_cyclic(|weak: &Weak<TentativeInner<T>>| {
            let node = Weak::clone(weak);
            TentativeInner {
                cell: Arc::new(PropertyCell::new(value, T::eq)),
                parent,
                duration,
                runtime,
                pending: Mutex::new(PendingRevert::default()),
                _parent: parent_source.subscribe(move || {
                    if let Some(node) = node.upgrade() {
                        node.follow_parent();
                    }
                }),
            }
        });
        Ok(Self {
            #[cfg(debug_assertions)]
            defined_at: Location::caller(),
            inner,
        })
    }
}

impl<T> TentativeProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Whether an override is in effect, i.e., a revert is pending.
    pub fn is_overridden(&self) -> bool {
        self.inner.pending.lock().or_poisoned().revert.is_some()
    }

    /// Cancels the pending revert, if any, and goes back to following the parent's changes.
    ///
    /// The current value is kept until the parent next changes. A revert that has already taken
    /// effect stays; one that has not is suppressed. Calling this more than once is harmless.
    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl<T> GetUntracked for TentativeProperty<T>
where
    T: Clone,
{
    type Value = T;

    fn get_untracked(&self) -> T {
        self.inner.cell.get()
    }
}

impl<T> Set for TentativeProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Overrides the value for the property's duration, restarting the countdown if an override
    /// is already in effect.
    fn set(&self, value: T) {
        self.inner.override_with(value);
    }
}
