use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::impl_domain_label_conversions;

/// Claim named by a `ClaimInvalid` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimKind {
    Issuer,
    Audience,
    Expiry,
    IssuedAt,
    NotBefore,
    Subject,
    AuthorizedParty,
}

impl_domain_label_conversions!(ClaimKind {
    Issuer => "iss",
    Audience => "aud",
    Expiry => "exp",
    IssuedAt => "iat",
    NotBefore => "nbf",
    Subject => "sub",
    AuthorizedParty => "azp",
});

/// Claims of an ID token whose signature and registered claims passed
/// verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClaims {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expiry: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
    pub raw_claims: Map<String, Value>,
}

impl ValidatedClaims {
    /// String-valued claim by name.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.raw_claims.get(name).and_then(Value::as_str)
    }

    /// Human-readable name for the subject, if the provider sent one.
    pub fn display_name(&self) -> Option<&str> {
        self.claim_str("preferred_username")
            .or_else(|| self.claim_str("name"))
            .or_else(|| self.claim_str("email"))
    }
}
