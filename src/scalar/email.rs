//! # Email Addresses
//!
//! Syntactic validation only; no DNS or mailbox checks.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{FormatError, ScalarResult};
use super::ScalarType;

/// Maximum address length (RFC 5321 path limit)
const MAX_LENGTH: usize = 254;

static LOCAL_PART: OnceLock<Regex> = OnceLock::new();
static DOMAIN_LABEL: OnceLock<Regex> = OnceLock::new();
static TOP_LEVEL: OnceLock<Regex> = OnceLock::new();

fn local_part() -> &'static Regex {
    LOCAL_PART.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
            .expect("invalid regex")
    })
}

fn domain_label() -> &'static Regex {
    DOMAIN_LABEL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("invalid regex")
    })
}

fn top_level() -> &'static Regex {
    TOP_LEVEL.get_or_init(|| Regex::new(r"^[A-Za-z]{2,63}$").expect("invalid regex"))
}

/// A syntactically valid email address.
///
/// The canonical form is the input itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// The local part (before `@`)
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map(|(local, _)| local).unwrap_or_default()
    }

    /// The domain (after `@`)
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, domain)| domain).unwrap_or_default()
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ScalarType for Email {
    const NAME: &'static str = "Email";

    fn parse(input: &str) -> ScalarResult<Self> {
        let fail = |reason: &str| FormatError::new(Self::NAME, input, reason);

        if input.is_empty() {
            return Err(fail("empty address"));
        }
        if input.len() > MAX_LENGTH {
            return Err(fail("address too long"));
        }
        if input.matches('@').count() != 1 {
            return Err(fail("address must contain exactly one '@'"));
        }

        let (local, domain) = input.split_once('@').ok_or_else(|| fail("missing '@'"))?;
        if local.is_empty() {
            return Err(fail("empty local part"));
        }
        if domain.is_empty() {
            return Err(fail("empty domain"));
        }
        if !local_part().is_match(local) {
            return Err(fail("invalid local part"));
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 {
            return Err(fail("domain must have at least two labels"));
        }
        if labels.iter().any(|label| !domain_label().is_match(label)) {
            return Err(fail("invalid domain label"));
        }
        if labels.last().map_or(true, |tld| !top_level().is_match(tld)) {
            return Err(fail("invalid top-level domain"));
        }

        Ok(Self(input.to_string()))
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

scalar_serde!(Email);
