//! The set of listeners affiliated with a single property.
//!
//! Like the source and subscriber sets of a reactive node, this is a linear map built on a
//! `Vec<_>`: a property usually has a handful of listeners, so a linear search on removal costs
//! less than hashing would, and insertion order is preserved for free.

use super::SubscriptionId;
use crate::{context::ExecutionContext, event::Listener};
use std::sync::Arc;

pub(crate) struct ListenerSet<T> {
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    context: Option<Arc<dyn ExecutionContext>>,
}

impl<T> ListenerSet<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::with_capacity(2),
            context: None,
        }
    }

    pub fn with_context(context: Option<Arc<dyn ExecutionContext>>) -> Self {
        Self {
            context,
            ..Self::new()
        }
    }

    pub fn subscribe(&mut self, listener: Listener<T>) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.listeners.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        if let Some(pos) = self.listeners.iter().position(|(s, _)| *s == id) {
            // not `.swap_remove()`: delivery follows subscription order
            self.listeners.remove(pos);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Clones out everything needed to notify, so the caller can release its lock first.
    pub fn snapshot(
        &self,
    ) -> (Vec<Listener<T>>, Option<Arc<dyn ExecutionContext>>) {
        (
            self.listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
            self.context.clone(),
        )
    }
}
