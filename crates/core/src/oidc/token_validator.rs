//! ID token verification
//!
//! No token is trusted before its signature verifies against a published
//! provider key. Registered claims are then checked one by one so each
//! failure names the claim at fault.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};
use ssogate_common::Clock;
use ssogate_domain::constants::DEFAULT_CLOCK_SKEW_SECS;
use ssogate_domain::{AuthFlowError, ClaimKind, ProviderConfig, TokenSet, ValidatedClaims};
use tracing::debug;

use super::jwks::{JwksCache, SigningKey};

/// Asymmetric algorithms accepted in ID token headers.
pub const ALLOWED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

pub struct TokenValidator {
    config: Arc<ProviderConfig>,
    jwks: Arc<JwksCache>,
    clock: Arc<dyn Clock>,
    clock_skew: Duration,
}

impl TokenValidator {
    pub fn new(config: Arc<ProviderConfig>, jwks: Arc<JwksCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            jwks,
            clock,
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECS as i64),
        }
    }

    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Verify the ID token of `token_set` and return its claims.
    ///
    /// # Errors
    /// - `MalformedToken` if the token is not a compact JWS.
    /// - `SignatureInvalid` if the algorithm is not allowed or the signature
    ///   does not verify.
    /// - `UnknownSigningKey` if no published key matches the header `kid`.
    /// - `ClaimInvalid { which }` naming the first claim that fails.
    pub async fn validate_id_token(
        &self,
        token_set: &TokenSet,
    ) -> Result<ValidatedClaims, AuthFlowError> {
        let token = token_set.id_token.expose();
        let header = decode_header(token).map_err(|e| AuthFlowError::MalformedToken(e.to_string()))?;

        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            return Err(AuthFlowError::SignatureInvalid(format!(
                "algorithm {:?} not allowed",
                header.alg
            )));
        }

        let signing_key = self.jwks.signing_key(header.kid.as_deref()).await?;
        if let Some(expected) = signing_key.algorithm {
            if expected != header.alg {
                return Err(AuthFlowError::SignatureInvalid(format!(
                    "key expects {:?}, token uses {:?}",
                    expected, header.alg
                )));
            }
        }

        let claims = verify_signature(token.to_string(), signing_key, header.alg).await?;
        let validated = self.check_claims(claims)?;

        debug!(kid = header.kid.as_deref().unwrap_or("-"), "ID token validated");
        Ok(validated)
    }

    fn check_claims(&self, claims: Map<String, Value>) -> Result<ValidatedClaims, AuthFlowError> {
        let invalid = |which| AuthFlowError::ClaimInvalid { which };
        let now = self.clock.now();

        let issuer = claims.get("iss").and_then(Value::as_str).ok_or(invalid(ClaimKind::Issuer))?;
        if issuer != self.config.issuer {
            return Err(invalid(ClaimKind::Issuer));
        }

        let audience = audiences(claims.get("aud")).ok_or(invalid(ClaimKind::Audience))?;
        if !audience.iter().any(|aud| aud == &self.config.client_id) {
            return Err(invalid(ClaimKind::Audience));
        }
        if let Some(azp) = claims.get("azp") {
            if azp.as_str() != Some(self.config.client_id.as_str()) {
                return Err(invalid(ClaimKind::AuthorizedParty));
            }
        }

        // Timestamps near chrono's limits cannot absorb the skew; such tokens
        // fail the claim instead of overflowing.
        let expiry = timestamp(claims.get("exp")).ok_or(invalid(ClaimKind::Expiry))?;
        let latest = expiry.checked_add_signed(self.clock_skew).ok_or(invalid(ClaimKind::Expiry))?;
        if now > latest {
            return Err(invalid(ClaimKind::Expiry));
        }

        let issued_at = timestamp(claims.get("iat")).ok_or(invalid(ClaimKind::IssuedAt))?;
        let earliest =
            issued_at.checked_sub_signed(self.clock_skew).ok_or(invalid(ClaimKind::IssuedAt))?;
        if now < earliest {
            return Err(invalid(ClaimKind::IssuedAt));
        }

        if let Some(nbf) = claims.get("nbf") {
            let not_before = timestamp(Some(nbf)).ok_or(invalid(ClaimKind::NotBefore))?;
            let earliest =
                not_before.checked_sub_signed(self.clock_skew).ok_or(invalid(ClaimKind::NotBefore))?;
            if now < earliest {
                return Err(invalid(ClaimKind::NotBefore));
            }
        }

        let subject = claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(invalid(ClaimKind::Subject))?;

        Ok(ValidatedClaims {
            subject: subject.to_string(),
            issuer: issuer.to_string(),
            audience,
            expiry,
            issued_at,
            raw_claims: claims,
        })
    }
}

/// Check the signature off the async executor; RSA verification is the one
/// CPU-bound step of the flow.
async fn verify_signature(
    token: String,
    signing_key: SigningKey,
    alg: Algorithm,
) -> Result<Map<String, Value>, AuthFlowError> {
    tokio::task::spawn_blocking(move || {
        let mut validation = Validation::new(alg);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Map<String, Value>>(&token, &signing_key.key, &validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    })
    .await
    .map_err(|e| AuthFlowError::SignatureInvalid(format!("verification task failed: {e}")))?
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthFlowError {
    match err.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthFlowError::MalformedToken(err.to_string()),
        _ => AuthFlowError::SignatureInvalid(err.to_string()),
    }
}

/// `aud` as a list; a single string counts as a one-element list.
fn audiences(value: Option<&Value>) -> Option<Vec<String>> {
    match value? {
        Value::String(aud) => Some(vec![aud.clone()]),
        Value::Array(items) => {
            items.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>()
        }
        _ => None,
    }
}

/// NumericDate claim (seconds since the epoch, integer or float).
fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let secs = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}
