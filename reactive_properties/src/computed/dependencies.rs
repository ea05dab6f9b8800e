use crate::{
    graph::{AnySource, ToAnySource},
    traits::GetUntracked,
};

/// A fixed group of typed properties that a [`DerivedProperty`](super::DerivedProperty) can be
/// computed from.
///
/// Implemented for tuples of one to eight properties, of any mix of kinds and value types.
pub trait Dependencies: Send + Sync + 'static {
    /// The values of the properties, as a tuple in the same order.
    type Values;

    /// Reads the current value of every property, without tracking.
    fn values(&self) -> Self::Values;

    /// The type-erased properties, in order.
    fn sources(&self) -> Vec<AnySource>;
}

macro_rules! impl_dependencies {
    ($($T:ident, $N:tt,)*) => {
        impl<$($T,)*> Dependencies for ($($T,)*)
        where
            $($T: GetUntracked + ToAnySource + Send + Sync + 'static,)*
        {
            type Values = ($($T::Value,)*);

            fn values(&self) -> Self::Values {
                ($(self.$N.get_untracked(),)*)
            }

            fn sources(&self) -> Vec<AnySource> {
                vec![$(self.$N.to_any_source(),)*]
            }
        }
    };
}

#[rustfmt::skip]
mod impl_tuples {
    use super::*;

    impl_dependencies!(T0, 0,);
    impl_dependencies!(T0, 0, T1, 1,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2, T3, 3,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2, T3, 3, T4, 4,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2, T3, 3, T4, 4, T5, 5,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2, T3, 3, T4, 4, T5, 5, T6, 6,);
    impl_dependencies!(T0, 0, T1, 1, T2, 2, T3, 3, T4, 4, T5, 5, T6, 6, T7, 7,);
}
