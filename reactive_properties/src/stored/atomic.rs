//! Read-modify-write operations on stored properties.
//!
//! Each operation runs entirely under the property's write lock, so it is linearizable with
//! respect to every other write, and fires at most one change event once the lock is released.

use super::StoredProperty;

/// How far apart two floating-point values must be before replacing one with the other counts
/// as a change.
///
/// `StoredProperty::<f32>::DEFAULT_TOLERANCE` and `StoredProperty::<f64>::DEFAULT_TOLERANCE` are
/// this value in the property's own float type.
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

impl<T> StoredProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Stores `value`, returning the previous value.
    pub fn exchange(&self, value: T) -> T {
        self.inner.update_with(|old| (Some(value), old.clone()))
    }

    /// Stores `new` if the current value is the same as `current`.
    ///
    /// Like [`AtomicUsize::compare_exchange`](std::sync::atomic::AtomicUsize::compare_exchange),
    /// the result is `Ok` with the previous value if the exchange happened, and `Err` with the
    /// current value if it did not. A failed exchange fires no event.
    pub fn compare_exchange(&self, current: T, new: T) -> Result<T, T> {
        let inner = &self.inner;
        inner.update_with(|value| {
            if inner.is_same(value, &current) {
                (Some(new), Ok(value.clone()))
            } else {
                (None, Err(value.clone()))
            }
        })
    }
}

macro_rules! integer_ops {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StoredProperty<$ty> {
                /// Adds one, wrapping around on overflow, and returns the new value.
                pub fn increment(&self) -> $ty {
                    self.add(1)
                }

                /// Subtracts one, wrapping around on overflow, and returns the new value.
                pub fn decrement(&self) -> $ty {
                    self.inner.update_with(|value| {
                        let new = value.wrapping_sub(1);
                        (Some(new), new)
                    })
                }

                /// Adds `delta`, wrapping around on overflow, and returns the new value.
                #[allow(clippy::should_implement_trait)]
                pub fn add(&self, delta: $ty) -> $ty {
                    self.inner.update_with(|value| {
                        let new = value.wrapping_add(delta);
                        (Some(new), new)
                    })
                }
            }
        )*
    };
}

integer_ops!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

macro_rules! float_ops {
    ($($ty:ident),* $(,)?) => {
        $(
            impl StoredProperty<$ty> {
                /// [`DEFAULT_TOLERANCE`] for this float type.
                pub const DEFAULT_TOLERANCE: $ty = DEFAULT_TOLERANCE as $ty;

                /// Stores `value` and returns the previous value, treating values within
                /// `tolerance` of each other as the same: such a value is neither stored nor
                /// announced.
                pub fn exchange_with_tolerance(
                    &self,
                    value: $ty,
                    tolerance: $ty,
                ) -> $ty {
                    self.inner.update_with_compare(
                        |old| (Some(value), *old),
                        |old, new| (old - new).abs() <= tolerance,
                    )
                }

                /// Stores `new` if the current value is exactly `current`, treating values
                /// within `tolerance` of each other as the same when deciding whether to fire
                /// an event.
                ///
                /// Returns `Ok` with the previous value if the current value matched, and `Err`
                /// with the current value otherwise.
                pub fn compare_exchange_with_tolerance(
                    &self,
                    current: $ty,
                    new: $ty,
                    tolerance: $ty,
                ) -> Result<$ty, $ty> {
                    self.inner.update_with_compare(
                        |value| {
                            if *value == current {
                                (Some(new), Ok(*value))
                            } else {
                                (None, Err(*value))
                            }
                        },
                        |old, new| (old - new).abs() <= tolerance,
                    )
                }
            }
        )*
    };
}

float_ops!(f32, f64);
