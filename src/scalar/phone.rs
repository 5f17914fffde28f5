//! # Phone Numbers
//!
//! Numbers must carry a country calling code. Validity and the E.164 form
//! come from the `phonenumber` metadata.

use std::fmt;

use phonenumber::{Mode, PhoneNumber};

use super::errors::{FormatError, ScalarResult};
use super::ScalarType;

/// Punctuation that formatting conventions put inside numbers
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '(' | ')' | '-' | '.')
}

/// A valid phone number in canonical E.164 form (e.g. `+16198675309`).
#[derive(Debug, Clone)]
pub struct Phone {
    number: PhoneNumber,
    e164: String,
}

impl Phone {
    /// The underlying parsed number
    pub fn number(&self) -> &PhoneNumber {
        &self.number
    }

    /// Country calling code (e.g. `1`, `52`)
    pub fn country_code(&self) -> u16 {
        self.number.code().value()
    }

    /// Canonical E.164 string
    pub fn as_str(&self) -> &str {
        &self.e164
    }

    fn from_number(number: PhoneNumber, input: &str) -> ScalarResult<Self> {
        if !phonenumber::is_valid(&number) {
            return Err(FormatError::new(
                Self::NAME,
                input,
                "not a valid number for its region",
            ));
        }
        let e164 = number.format().mode(Mode::E164).to_string();
        Ok(Self { number, e164 })
    }
}

impl ScalarType for Phone {
    const NAME: &'static str = "Phone";

    fn parse(input: &str) -> ScalarResult<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(FormatError::new(Self::NAME, input, "empty number"));
        }
        if let Some(c) = trimmed.chars().find(|c| !is_allowed_char(*c)) {
            return Err(FormatError::new(
                Self::NAME,
                input,
                format!("unexpected character '{}'", c),
            ));
        }
        if !trimmed.starts_with('+') {
            return Err(FormatError::new(
                Self::NAME,
                input,
                "missing country calling code",
            ));
        }

        let number = phonenumber::parse(None, trimmed)
            .map_err(|e| FormatError::new(Self::NAME, input, e.to_string()))?;
        Self::from_number(number, input)
    }
}

impl TryFrom<PhoneNumber> for Phone {
    type Error = FormatError;

    fn try_from(number: PhoneNumber) -> Result<Self, Self::Error> {
        let input = number.format().mode(Mode::E164).to_string();
        Self::from_number(number, &input)
    }
}

impl PartialEq for Phone {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for Phone {}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.e164)
    }
}

scalar_serde!(Phone);
