//! # Dates and Instants
//!
//! - `Date` accepts `YYYY-MM-DD` or `YYYYMMDD`, formats `YYYY-MM-DD`
//! - `DateTime` requires an explicit offset and is stored in UTC, so
//!   `1990-01-01T00:00:00-02:00` and `1990-01-01T02:00:00+00:00` are the same
//!   value and both format with `+00:00`

use std::fmt;

use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};

use super::errors::{FormatError, ScalarResult};
use super::ScalarType;

/// A calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// The underlying calendar date
    pub fn value(&self) -> NaiveDate {
        self.0
    }
}

/// Exactly `YYYY-MM-DD`: digits, with dashes at offsets 4 and 7
fn is_iso_shape(input: &str) -> bool {
    input.len() == 10
        && input.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

impl ScalarType for Date {
    const NAME: &'static str = "Date";

    fn parse(input: &str) -> ScalarResult<Self> {
        let compact = input.len() == 8 && input.bytes().all(|b| b.is_ascii_digit());
        let pattern = if compact { "%Y%m%d" } else { "%Y-%m-%d" };

        if !compact && !is_iso_shape(input) {
            return Err(FormatError::new(
                Self::NAME,
                input,
                "expected YYYY-MM-DD or YYYYMMDD",
            ));
        }

        NaiveDate::parse_from_str(input, pattern)
            .map(Self)
            .map_err(|e| FormatError::new(Self::NAME, input, e.to_string()))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

scalar_serde!(Date);

/// An instant in time, normalised to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(chrono::DateTime<Utc>);

impl DateTime {
    /// The underlying UTC instant
    pub fn value(&self) -> chrono::DateTime<Utc> {
        self.0
    }
}

impl ScalarType for DateTime {
    const NAME: &'static str = "DateTime";

    fn parse(input: &str) -> ScalarResult<Self> {
        chrono::DateTime::parse_from_rfc3339(input)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| {
                FormatError::new(
                    Self::NAME,
                    input,
                    format!("expected ISO 8601 datetime with offset ({})", e),
                )
            })
    }
}

impl<Tz: TimeZone> From<chrono::DateTime<Tz>> for DateTime {
    fn from(dt: chrono::DateTime<Tz>) -> Self {
        Self(dt.with_timezone(&Utc))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

scalar_serde!(DateTime);
