use crate::PreferenceValue;

/// A type persisted through a primitive raw form, typically an enumeration stored as its
/// integer discriminant or its string name.
///
/// Pair an implementation with [`raw_preference_value!`](crate::raw_preference_value) to make
/// the type usable as a preference. Raw values with no matching case read as the key's default.
///
/// # Example
/// ```rust
/// use typed_defaults::{preference_key, raw_preference_value, MemoryStore, RawRepresentable};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Theme {
///     Light,
///     Dark,
/// }
///
/// impl RawRepresentable for Theme {
///     type Raw = String;
///
///     fn to_raw(&self) -> String {
///         match self {
///             Theme::Light => "light".to_string(),
///             Theme::Dark => "dark".to_string(),
///         }
///     }
///
///     fn from_raw(raw: String) -> Option<Self> {
///         match raw.as_str() {
///             "light" => Some(Theme::Light),
///             "dark" => Some(Theme::Dark),
///             _ => None,
///         }
///     }
/// }
///
/// raw_preference_value!(Theme);
///
/// preference_key!(const THEME: Theme = "theme", Theme::Light);
///
/// let store = MemoryStore::new();
/// THEME.set(&store, Theme::Dark).unwrap();
/// assert_eq!(THEME.get(&store), Theme::Dark);
/// ```
pub trait RawRepresentable: Sized {
    /// The primitive form the value is stored as.
    type Raw: PreferenceValue;

    /// Convert the value to its raw form.
    fn to_raw(&self) -> Self::Raw;

    /// Rebuild the value from its raw form. `None` if the raw value has no matching case.
    fn from_raw(raw: Self::Raw) -> Option<Self>;
}

/// Implement [`PreferenceValue`] for types implementing [`RawRepresentable`].
#[macro_export]
macro_rules! raw_preference_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::PreferenceValue for $ty {
                fn to_stored(&self) -> ::core::option::Option<$crate::StoredValue> {
                    $crate::PreferenceValue::to_stored(
                        &<$ty as $crate::RawRepresentable>::to_raw(self),
                    )
                }

                fn from_stored(
                    value: $crate::StoredValue,
                ) -> ::core::option::Option<Self> {
                    <<$ty as $crate::RawRepresentable>::Raw as $crate::PreferenceValue>::from_stored(
                        value,
                    )
                    .and_then(<$ty as $crate::RawRepresentable>::from_raw)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use typed_defaults_store::{MemoryStore, Store, StoredValue};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Interval {
        Hourly = 1,
        Daily = 24,
        Weekly = 168,
    }

    impl RawRepresentable for Interval {
        type Raw = i64;

        fn to_raw(&self) -> i64 {
            *self as i64
        }

        fn from_raw(raw: i64) -> Option<Self> {
            match raw {
                1 => Some(Interval::Hourly),
                24 => Some(Interval::Daily),
                168 => Some(Interval::Weekly),
                _ => None,
            }
        }
    }

    crate::raw_preference_value!(Interval);

    crate::preference_key!(const SYNC_INTERVAL: Interval = "sync_interval", Interval::Daily);
    crate::preference_key!(const BACKUP_INTERVAL: Option<Interval> = "backup_interval");

    #[test]
    fn test_stores_raw_form() {
        let store = MemoryStore::new();

        SYNC_INTERVAL.set(&store, Interval::Weekly).unwrap();
        assert_eq!(
            store.get("sync_interval").unwrap(),
            Some(StoredValue::Integer(168))
        );
        assert_eq!(SYNC_INTERVAL.get(&store), Interval::Weekly);
    }

    #[test]
    fn test_unknown_case_uses_default() {
        let store = MemoryStore::new();
        assert_eq!(SYNC_INTERVAL.get(&store), Interval::Daily);

        store.set("sync_interval", StoredValue::Integer(7)).unwrap();
        assert_eq!(SYNC_INTERVAL.get(&store), Interval::Daily);

        store
            .set("sync_interval", StoredValue::String("weekly".into()))
            .unwrap();
        assert_eq!(SYNC_INTERVAL.get(&store), Interval::Daily);
    }

    #[test]
    fn test_optional_raw() {
        let store = MemoryStore::new();
        assert_eq!(BACKUP_INTERVAL.get(&store), None);

        BACKUP_INTERVAL.set(&store, Some(Interval::Hourly)).unwrap();
        assert_eq!(BACKUP_INTERVAL.get(&store), Some(Interval::Hourly));

        store.set("backup_interval", StoredValue::Integer(-1)).unwrap();
        assert_eq!(BACKUP_INTERVAL.get(&store), None);
    }
}
