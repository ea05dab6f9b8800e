use crate::{
    context::{self, ExecutionContext},
    event::{ChangeEvent, Listener},
    graph::{AnyListener, ListenerSet, Source, SubscriptionId},
};
use or_poisoned::OrPoisoned;
use std::{
    any::Any,
    fmt::Debug,
    ops::DerefMut,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, RwLock},
};

/// Decides whether two values are the same, i.e., whether replacing one with the other should
/// go unnoticed by listeners.
pub(crate) type IsSame<T> = fn(&T, &T) -> bool;

/// Runs `fun` with `guard` held, and drops the guard before a panic in `fun` resumes.
///
/// A guard dropped while unwinding poisons its lock. Every write guard that user code (a
/// comparison, a `Clone` impl, an update closure) runs under goes through here instead.
pub(crate) fn release_before_unwind<G, U>(
    mut guard: G,
    fun: impl FnOnce(&mut G::Target) -> U,
) -> U
where
    G: DerefMut,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| fun(&mut *guard)));
    drop(guard);
    match result {
        Ok(output) => output,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// The cached value slot and listener registry shared by every kind of property.
///
/// The value lock is only ever held for a clone, a comparison or a write. It is always released
/// before listeners run.
pub(crate) struct PropertyCell<T> {
    value: RwLock<T>,
    listeners: RwLock<ListenerSet<T>>,
    is_same: IsSame<T>,
}

impl<T> PropertyCell<T> {
    pub fn new(value: T, is_same: IsSame<T>) -> Self {
        Self::with_context(value, is_same, None)
    }

    pub fn with_context(
        value: T,
        is_same: IsSame<T>,
        context: Option<Arc<dyn ExecutionContext>>,
    ) -> Self {
        Self {
            value: RwLock::new(value),
            listeners: RwLock::new(ListenerSet::with_context(context)),
            is_same,
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.read().or_poisoned().clone()
    }

    pub fn is_same(&self, a: &T, b: &T) -> bool {
        (self.is_same)(a, b)
    }

    pub fn with_value<U>(&self, fun: impl FnOnce(&T) -> U) -> U {
        fun(&self.value.read().or_poisoned())
    }

    fn with_value_mut<U>(&self, fun: impl FnOnce(&mut T) -> U) -> U {
        release_before_unwind(self.value.write().or_poisoned(), fun)
    }

    pub fn add_listener(&self, listener: Listener<T>) -> SubscriptionId {
        self.listeners.write().or_poisoned().subscribe(listener)
    }

    pub fn remove_listener(&self, id: SubscriptionId) {
        self.listeners.write().or_poisoned().unsubscribe(id);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().or_poisoned().len()
    }
}

impl<T> PropertyCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Compares `new` with the current value and stores it if they differ, all under the value
    /// lock. Returns the event to deliver, if any.
    pub fn replace(&self, new: T) -> Option<ChangeEvent<T>> {
        let is_same = self.is_same;
        self.with_value_mut(|value| {
            if is_same(value, &new) {
                None
            } else {
                let old = std::mem::replace(value, new.clone());
                Some(ChangeEvent::new(old, new))
            }
        })
    }

    /// Stores `new` and notifies listeners if it differs from the current value.
    ///
    /// Returns whether the value changed.
    pub fn store(&self, new: T) -> bool {
        match self.replace(new) {
            Some(event) => {
                self.notify(event);
                true
            }
            None => false,
        }
    }

    /// Runs `fun` against the value while holding the write lock. `fun` returns the value it
    /// wants to store, or `None` to leave the slot untouched; the output is handed back either
    /// way.
    ///
    /// At most one event is delivered, after the lock is released.
    pub fn update_with<U>(&self, fun: impl FnOnce(&T) -> (Option<T>, U)) -> U {
        self.update_with_compare(fun, self.is_same)
    }

    /// Like [`update_with`](Self::update_with), deciding whether the proposed value is a change
    /// with `is_same` instead of the cell's own equality.
    pub fn update_with_compare<U>(
        &self,
        fun: impl FnOnce(&T) -> (Option<T>, U),
        is_same: impl FnOnce(&T, &T) -> bool,
    ) -> U {
        let (event, output) = self.with_value_mut(|value| {
            let (new, output) = fun(value);
            let event = new.and_then(|new| {
                if is_same(value, &new) {
                    None
                } else {
                    let old = std::mem::replace(value, new.clone());
                    Some(ChangeEvent::new(old, new))
                }
            });
            (event, output)
        });
        if let Some(event) = event {
            self.notify(event);
        }
        output
    }

    pub fn notify(&self, event: ChangeEvent<T>) {
        context::dispatch(&self.listeners, event);
    }
}

impl<T> Source for PropertyCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn add_any_listener(&self, listener: AnyListener) -> SubscriptionId {
        self.add_listener(Arc::new(move |_: &ChangeEvent<T>| listener()))
    }

    fn remove_listener(&self, id: SubscriptionId) {
        PropertyCell::remove_listener(self, id);
    }

    fn get_any(&self) -> Box<dyn Any + Send> {
        Box::new(self.get())
    }

    fn listener_count(&self) -> usize {
        PropertyCell::listener_count(self)
    }
}

impl<T: Debug> Debug for PropertyCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyCell")
            .field("value", &*self.value.read().or_poisoned())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
