//! # Signed Tokens
//!
//! Compact JWS tokens verified against a configured key and algorithm
//! allow-list. A `Token` can only be produced by a `TokenType`, so there is
//! no way to hold an unverified or unconfigured token.
//!
//! Verification fails closed and every rejection looks the same to the
//! caller ("invalid token"); the underlying reason is logged at debug level.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::errors::{FormatError, ScalarResult};

/// Verified claim set, in the order the token carried it
pub type Claims = Map<String, Value>;

/// Placeholder used instead of echoing credentials into errors
const REDACTED: &str = "[redacted]";

/// Key material used to verify signatures
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "material", rename_all = "snake_case")]
pub enum TokenKey {
    /// Shared secret for HS256/HS384/HS512
    Secret(String),
    /// PEM-encoded RSA public key for RS*/PS*
    RsaPem(String),
    /// PEM-encoded EC public key for ES*
    EcPem(String),
    /// PEM-encoded Ed25519 public key for EdDSA
    EdPem(String),
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TokenKey::Secret(_) => "Secret",
            TokenKey::RsaPem(_) => "RsaPem",
            TokenKey::EcPem(_) => "EcPem",
            TokenKey::EdPem(_) => "EdPem",
        };
        write!(f, "{}({})", kind, REDACTED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
    Ed,
}

impl TokenKey {
    fn family(&self) -> KeyFamily {
        match self {
            TokenKey::Secret(_) => KeyFamily::Hmac,
            TokenKey::RsaPem(_) => KeyFamily::Rsa,
            TokenKey::EcPem(_) => KeyFamily::Ec,
            TokenKey::EdPem(_) => KeyFamily::Ed,
        }
    }

    fn decoding_key(&self) -> Result<DecodingKey, TokenConfigError> {
        let invalid = |e: jsonwebtoken::errors::Error| TokenConfigError::InvalidKey(e.to_string());
        match self {
            TokenKey::Secret(secret) => {
                if secret.is_empty() {
                    return Err(TokenConfigError::EmptyKey);
                }
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            TokenKey::RsaPem(pem) => DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(invalid),
            TokenKey::EcPem(pem) => DecodingKey::from_ec_pem(pem.as_bytes()).map_err(invalid),
            TokenKey::EdPem(pem) => DecodingKey::from_ed_pem(pem.as_bytes()).map_err(invalid),
        }
    }
}

fn algorithm_family(alg: Algorithm) -> KeyFamily {
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => KeyFamily::Hmac,
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => KeyFamily::Rsa,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
    }
}

/// Token verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Verification key
    pub key: TokenKey,

    /// Accepted signing algorithms, in preference order (must be non-empty)
    pub algorithms: Vec<Algorithm>,

    /// Clock skew tolerated on `exp`/`nbf`, in seconds (default: 60)
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: u64,

    /// Accepted `aud` values; `None` skips the audience check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<Vec<String>>,

    /// Accepted `iss` values; `None` skips the issuer check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Vec<String>>,

    /// Authorization header scheme (default: "Bearer")
    #[serde(default = "default_header_scheme")]
    pub header_scheme: String,
}

fn default_leeway_secs() -> u64 {
    60
}

fn default_header_scheme() -> String {
    "Bearer".to_string()
}

impl TokenConfig {
    /// Config with the given key and algorithms and default checks
    pub fn new(key: TokenKey, algorithms: Vec<Algorithm>) -> Self {
        Self {
            key,
            algorithms,
            leeway_secs: default_leeway_secs(),
            audience: None,
            issuer: None,
            header_scheme: default_header_scheme(),
        }
    }

    /// Shared-secret config
    pub fn hmac(secret: impl Into<String>, algorithms: Vec<Algorithm>) -> Self {
        Self::new(TokenKey::Secret(secret.into()), algorithms)
    }
}

/// A token configuration that cannot verify anything
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenConfigError {
    #[error("at least one signing algorithm is required")]
    NoAlgorithms,

    #[error("verification key is empty")]
    EmptyKey,

    #[error("invalid verification key: {0}")]
    InvalidKey(String),

    #[error("algorithm {0:?} cannot be verified with the configured key")]
    KeyMismatch(Algorithm),
}

static NEXT_TOKEN_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// A configured token type: the verifier that produces `Token` values.
///
/// Clones share the identity of the original; separately created types never
/// do, even under the same name and key.
#[derive(Clone)]
pub struct TokenType {
    id: u64,
    name: String,
    config: TokenConfig,
    key: DecodingKey,
    validation: Validation,
}

impl TokenType {
    /// Create a token type, rejecting configs that could never verify a token
    pub fn new(name: impl Into<String>, config: TokenConfig) -> Result<Self, TokenConfigError> {
        let first = *config.algorithms.first().ok_or(TokenConfigError::NoAlgorithms)?;

        let family = config.key.family();
        if let Some(alg) = config
            .algorithms
            .iter()
            .find(|alg| algorithm_family(**alg) != family)
        {
            return Err(TokenConfigError::KeyMismatch(*alg));
        }
        let key = config.key.decoding_key()?;

        let mut validation = Validation::new(first);
        validation.algorithms = config.algorithms.clone();
        validation.leeway = config.leeway_secs;
        validation.validate_nbf = true;
        validation.required_spec_claims.clear();
        match &config.audience {
            Some(audience) => validation.set_audience(audience),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(issuer);
        }

        Ok(Self {
            id: NEXT_TOKEN_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            config,
            key,
            validation,
        })
    }

    /// Type name used in annotations
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration this type verifies with
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn invalid(&self, reason: &str) -> FormatError {
        FormatError::new(self.name.as_str(), REDACTED, reason)
    }

    /// Verify a compact token and extract its claims
    pub fn parse(&self, compact: &str) -> ScalarResult<Token> {
        if compact.is_empty() || compact.split('.').count() != 3 {
            tracing::debug!(token_type = %self.name, "token rejected: malformed compact form");
            return Err(self.invalid("invalid token"));
        }

        let data = decode::<Claims>(compact, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(token_type = %self.name, reason = ?e.kind(), "token rejected");
            self.invalid("invalid token")
        })?;

        Ok(Token {
            verifier: self.id,
            type_name: self.name.clone(),
            compact: compact.to_string(),
            claims: data.claims,
        })
    }

    /// Verify the token carried by an `Authorization` header value
    /// (`"<scheme> <token>"`)
    pub fn from_auth_header(&self, header: Option<&str>) -> ScalarResult<Token> {
        let header = header.ok_or_else(|| {
            FormatError::new(self.name.as_str(), "", "missing authorization header")
        })?;

        let compact = header
            .strip_prefix(self.config.header_scheme.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                self.invalid(&format!(
                    "expected '{} <token>' authorization header",
                    self.config.header_scheme
                ))
            })?;

        self.parse(compact)
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenType")
            .field("name", &self.name)
            .field("algorithms", &self.config.algorithms)
            .finish()
    }
}

/// A verified token.
///
/// Formats as the compact form it was verified from; compares by claim set
/// and verifying type.
#[derive(Debug, Clone)]
pub struct Token {
    verifier: u64,
    type_name: String,
    compact: String,
    claims: Claims,
}

impl Token {
    /// Name of the token type that verified this token
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether `token_type` (or a clone of it) verified this token
    pub fn verified_by(&self, token_type: &TokenType) -> bool {
        self.verifier == token_type.id
    }

    /// Verified claims
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// A single claim
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// The compact token string
    pub fn as_str(&self) -> &str {
        &self.compact
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.verifier == other.verifier && self.claims == other.claims
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact)
    }
}

impl Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.compact)
    }
}
