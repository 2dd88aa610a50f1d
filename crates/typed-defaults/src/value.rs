use chrono::{DateTime, Utc};
use typed_defaults_store::StoredValue;
use url::Url;

use crate::json::{decode_json, encode_json};

/// A value that can be persisted as a preference.
///
/// Implementations decide which [`StoredValue`] wire type represents them and how to rebuild
/// themselves from it. Decoding is allowed to fail, in which case readers fall back to the key's
/// default.
///
/// Implementations are provided for `bool`, the integer types up to 64 bits that fit in an
/// `i64`, `f32`, `f64`, `String`, `Vec<u8>`, [`Url`], `DateTime<Utc>`, [`Json`](crate::Json)
/// and `Option` of any of these. Enumerations can be persisted through their raw form with
/// [`RawRepresentable`](crate::RawRepresentable).
pub trait PreferenceValue: Sized {
    /// The stored representation of this value, or `None` if the entry should be removed.
    fn to_stored(&self) -> Option<StoredValue>;

    /// Rebuild a value from its stored representation. `None` means the entry cannot be
    /// decoded as this type.
    fn from_stored(value: StoredValue) -> Option<Self>;

    /// Whether an optional key of this type reads its declared default when no entry exists.
    /// When `false`, an absent optional entry reads as `None` regardless of the default.
    const ABSENT_OPTIONAL_USES_DEFAULT: bool = true;

    /// Resolve a read that found no entry under the key's lookup name.
    fn absent(default: fn() -> Self) -> Self {
        default()
    }
}

impl PreferenceValue for bool {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::Bool(*self))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        value.as_bool()
    }
}

macro_rules! impl_integer {
    ($($ty:ty),+) => {
        $(
            impl PreferenceValue for $ty {
                fn to_stored(&self) -> Option<StoredValue> {
                    Some(StoredValue::Integer(i64::from(*self)))
                }

                fn from_stored(value: StoredValue) -> Option<Self> {
                    value.as_integer().and_then(|v| <$ty>::try_from(v).ok())
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32);

impl PreferenceValue for f64 {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::Double(*self))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        value.as_double()
    }
}

impl PreferenceValue for f32 {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::Double(f64::from(*self)))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        value.as_double().map(|v| v as f32)
    }
}

impl PreferenceValue for String {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::String(self.clone()))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        value.into_string()
    }

    const ABSENT_OPTIONAL_USES_DEFAULT: bool = false;
}

impl PreferenceValue for Vec<u8> {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::Data(self.clone()))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        value.into_data()
    }

    const ABSENT_OPTIONAL_USES_DEFAULT: bool = false;
}

impl PreferenceValue for Url {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(StoredValue::String(self.as_str().to_owned()))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        Url::parse(value.as_str()?).ok()
    }

    const ABSENT_OPTIONAL_USES_DEFAULT: bool = false;
}

// Timestamps are kept as JSON strings rather than a native wire type.
impl PreferenceValue for DateTime<Utc> {
    fn to_stored(&self) -> Option<StoredValue> {
        Some(encode_json(self))
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        decode_json(value)
    }

    const ABSENT_OPTIONAL_USES_DEFAULT: bool = false;
}

/// Optional values never fall back to a non-`None` default once an entry exists: an entry that
/// cannot be decoded reads as `None`. Writing `None` removes the entry.
///
/// Without an entry, optional strings, blobs, URLs and timestamps read as `None`. Other optional
/// types read the key's declared default.
impl<T: PreferenceValue> PreferenceValue for Option<T> {
    fn to_stored(&self) -> Option<StoredValue> {
        self.as_ref().and_then(T::to_stored)
    }

    fn from_stored(value: StoredValue) -> Option<Self> {
        Some(T::from_stored(value))
    }

    fn absent(default: fn() -> Self) -> Self {
        if T::ABSENT_OPTIONAL_USES_DEFAULT {
            default()
        } else {
            None
        }
    }
}
