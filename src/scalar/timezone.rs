//! # IANA Time Zones

use std::fmt;

use chrono_tz::Tz;

use super::errors::{FormatError, ScalarResult};
use super::ScalarType;

/// A time zone name found in the tz database (e.g. `America/Tijuana`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IanaTimeZone(Tz);

impl IanaTimeZone {
    /// The zone, usable with chrono conversions
    pub fn zone(&self) -> Tz {
        self.0
    }

    /// The zone name
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl ScalarType for IanaTimeZone {
    const NAME: &'static str = "IANATimeZone";

    fn parse(input: &str) -> ScalarResult<Self> {
        input
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| FormatError::new(Self::NAME, input, "unknown time zone"))
    }
}

impl From<Tz> for IanaTimeZone {
    fn from(zone: Tz) -> Self {
        Self(zone)
    }
}

impl fmt::Display for IanaTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

scalar_serde!(IanaTimeZone);
