//! Controls which thread delivers change events to listeners.
//!
//! By default, listeners run on the thread that changed the value, before the change returns. A
//! [`PassthroughProperty`](crate::computed::PassthroughProperty) can instead hand delivery to an
//! [`ExecutionContext`]. Only *delivery* moves: the value itself is always updated synchronously
//! and is visible to every reader immediately.

use crate::{event::ChangeEvent, graph::ListenerSet, log_warning};
use futures::channel::oneshot;
use or_poisoned::OrPoisoned;
use std::{
    fmt::Debug,
    panic::{self, AssertUnwindSafe},
    sync::RwLock,
};

/// Something that can run a callback and block the caller until it has completed.
pub trait ExecutionContext: Send + Sync {
    /// Runs `callback`, returning once it has finished.
    ///
    /// A panic in `callback` should propagate to the caller of `execute`.
    fn execute(&self, callback: Box<dyn FnOnce() + Send>);
}

/// Runs callbacks directly on the calling thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InlineContext;

impl ExecutionContext for InlineContext {
    fn execute(&self, callback: Box<dyn FnOnce() + Send>) {
        callback()
    }
}

/// Runs callbacks as tasks on the global [`any_spawner::Executor`], blocking the caller until
/// the task has finished.
///
/// The executor must have been initialized (for example with
/// [`Executor::init_futures_executor`](any_spawner::Executor::init_futures_executor)) and must
/// not be driven by the thread that changes the value, or delivery will never complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExecutorContext;

impl ExecutionContext for ExecutorContext {
    fn execute(&self, callback: Box<dyn FnOnce() + Send>) {
        let (tx, rx) = oneshot::channel();
        any_spawner::Executor::spawn(async move {
            let result = panic::catch_unwind(AssertUnwindSafe(callback));
            _ = tx.send(result);
        });

        match futures::executor::block_on(rx) {
            Ok(Ok(())) => {}
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => log_warning(format_args!(
                "Change event was never delivered: the executor dropped the \
                 task. Has any_spawner::Executor been initialized?"
            )),
        }
    }
}

/// Delivers `event` to every listener in `listeners`, in subscription order.
///
/// The listener lock is only held to take a snapshot, so listeners are free to subscribe and
/// unsubscribe while they run. A panicking listener stops delivery to the listeners after it.
pub(crate) fn dispatch<T>(
    listeners: &RwLock<ListenerSet<T>>,
    event: ChangeEvent<T>,
) where
    T: Send + Sync + 'static,
{
    let (listeners, context) = listeners.read().or_poisoned().snapshot();
    if listeners.is_empty() {
        return;
    }

    let deliver = move || {
        for listener in listeners {
            listener(&event);
        }
    };
    match context {
        Some(context) => context.execute(Box::new(deliver)),
        None => deliver(),
    }
}

impl Debug for dyn ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ExecutionContext")
    }
}
