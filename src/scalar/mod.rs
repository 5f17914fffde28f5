//! Scalar value types for schemander
//!
//! Atomic domain values that validate themselves on construction and always
//! format to a single canonical string:
//! - `Email`: syntactically valid address
//! - `Phone`: E.164 phone number
//! - `Date`: calendar date (`YYYY-MM-DD`)
//! - `DateTime`: instant normalised to UTC
//! - `IanaTimeZone`: named zone from the tz database
//! - `Token`: verified signed token, produced by a configured `TokenType`
//!
//! The input string is never retained: re-serialisation yields the canonical
//! form, not the spelling the value was parsed from.

/// Implements `FromStr`, `Serialize` and `Deserialize` in terms of
/// `ScalarType::parse` and the canonical `Display`.
macro_rules! scalar_serde {
    ($ty:ty) => {
        impl std::str::FromStr for $ty {
            type Err = $crate::scalar::FormatError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::scalar::ScalarType>::parse(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::scalar::ScalarType>::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

mod date;
mod email;
mod errors;
mod phone;
mod timezone;
mod token;

pub use date::{Date, DateTime};
pub use email::Email;
pub use errors::{FormatError, ScalarResult};
pub use phone::Phone;
pub use timezone::IanaTimeZone;
pub use token::{Claims, Token, TokenConfig, TokenConfigError, TokenKey, TokenType};

use std::fmt;

/// Capability shared by every scalar type.
///
/// Equality is defined on the canonical value, so `parse(format(v)) == v`.
pub trait ScalarType: Sized + Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Type name used in annotations and error messages
    const NAME: &'static str;

    /// Parse a string into a validated value
    fn parse(input: &str) -> ScalarResult<Self>;

    /// Canonical string form; never fails
    fn format(&self) -> String {
        self.to_string()
    }
}
