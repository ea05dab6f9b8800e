use crate::graph::{AnySource, Subscription};
use std::sync::{Arc, Weak};

/// Subscribes `on_change` to every property in `dependencies`.
///
/// The listeners only hold `node` weakly: once the node is gone they do nothing, and dropping
/// the returned subscriptions removes them.
pub(crate) fn listen_for_dependency_updates<N>(
    node: &Weak<N>,
    dependencies: &[AnySource],
    on_change: fn(&Arc<N>),
) -> Vec<Subscription>
where
    N: Send + Sync + 'static,
{
    dependencies
        .iter()
        .map(|dependency| {
            let node = Weak::clone(node);
            dependency.subscribe(move || {
                if let Some(node) = node.upgrade() {
                    on_change(&node);
                }
            })
        })
        .collect()
}

/// Implements the handle boilerplate shared by every computed property: a handle is a
/// `defined_at` location plus an `Arc` of shared state with a `cell` field.
macro_rules! impl_computed_handle {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T> Clone for $ty<T> {
                #[track_caller]
                fn clone(&self) -> Self {
                    Self {
                        #[cfg(debug_assertions)]
                        defined_at: self.defined_at,
                        inner: std::sync::Arc::clone(&self.inner),
                    }
                }
            }

            impl<T> core::fmt::Debug for $ty<T> {
                fn fmt(
                    &self,
                    f: &mut core::fmt::Formatter<'_>,
                ) -> core::fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field("type", &std::any::type_name::<T>())
                        .field("value", &std::sync::Arc::as_ptr(&self.inner))
                        .finish()
                }
            }

            impl<T> PartialEq for $ty<T> {
                fn eq(&self, other: &Self) -> bool {
                    std::sync::Arc::ptr_eq(&self.inner, &other.inner)
                }
            }

            impl<T> Eq for $ty<T> {}

            impl<T> std::hash::Hash for $ty<T> {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    std::ptr::hash(&std::sync::Arc::as_ptr(&self.inner), state);
                }
            }

            impl<T> $crate::traits::DefinedAt for $ty<T> {
                #[inline(always)]
                fn defined_at(
                    &self,
                ) -> Option<&'static std::panic::Location<'static>> {
                    #[cfg(debug_assertions)]
                    {
                        Some(self.defined_at)
                    }
                    #[cfg(not(debug_assertions))]
                    {
                        None
                    }
                }
            }

            impl<T> $crate::graph::ToAnySource for $ty<T>
            where
                T: Clone + Send + Sync + 'static,
            {
                fn to_any_source(&self) -> $crate::graph::AnySource {
                    $crate::graph::AnySource::new(
                        &self.inner.cell,
                        $crate::traits::DefinedAt::defined_at(self),
                    )
                }
            }

            impl<T> $crate::traits::Subscribe for $ty<T>
            where
                T: Clone + Send + Sync + 'static,
            {
                fn add_listener(
                    &self,
                    listener: $crate::event::Listener<T>,
                ) -> $crate::graph::Subscription {
                    $crate::graph::Subscription::new(
                        $crate::graph::ToAnySource::to_any_source(self),
                        self.inner.cell.add_listener(listener),
                    )
                }
            }
        )*
    };
}
