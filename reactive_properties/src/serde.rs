use crate::{
    computed::{
        ConnectableProperty, DerivedProperty, ManuallyRecalculatedProperty,
        MultiLevelProperty, PassthroughProperty, TentativeProperty,
    },
    stored::StoredProperty,
    traits::GetUntracked,
};
use serde::{Deserialize, Serialize};

impl<T: Serialize> Serialize for StoredProperty<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.with_value(|value| value.serialize(serializer))
    }
}

impl<'de, T> Deserialize<'de> for StoredProperty<T>
where
    T: Deserialize<'de> + Clone + PartialEq + Send + Sync + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(StoredProperty::new)
    }
}

macro_rules! serialize_current_value {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T> Serialize for $ty<T>
            where
                T: Serialize + Clone + Send + Sync + 'static,
            {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    self.get_untracked().serialize(serializer)
                }
            }
        )*
    };
}

serialize_current_value!(
    ConnectableProperty,
    DerivedProperty,
    ManuallyRecalculatedProperty,
    MultiLevelProperty,
    PassthroughProperty,
    TentativeProperty,
);
