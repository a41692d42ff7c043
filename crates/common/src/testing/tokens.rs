//! Fixture RSA keys and helpers for minting ID tokens in tests.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

const PRIMARY_PEM: &str = include_str!("fixtures/signing_key_primary.pem");
const SECONDARY_PEM: &str = include_str!("fixtures/signing_key_secondary.pem");

const PRIMARY_MODULUS: &str = "ml93gHMIuwEdhaDABtsRkn7-6_LIm3R37AjMOxD0VNVdA2Z6F0UvJu5qdyl8PjfiJk-h1KUVrrzBFBNBNbvXX5AGERIIh-eCnbRJD3hIOuOUSVUoPKQLdj1Sa0dkbT9_oFXUps1F3pQ3fxuItyEue4Pp-Xql4NGCMQ4sp1oy17MfQ3R-I5u5YSONCzU2cSaLQawbePF2Lrbsgybwu9rBWcL96ATTQfjg-X7j8MRsXXdMjpUHcA4YhD0APiojemiZ6ccIo-ksHGgBYPXjoxiQRwB6dvdhgbDt1pFvNB7t6S5RAHnj9vg0MJbER_fjMYFoDenWbF0B2A6OnBQ5Uar0Sw";
const SECONDARY_MODULUS: &str = "rZIyCeXu4rACixXHiWHmba_WMziACGmzTTHvfxYPvlki70edoVfeX3Eesh7aW2IWeyAFDixiuZCblUJqvOoaWeP3DQZO4srNym_LXcGzrMMaRYeo9_sEVaeDj5CutVLkYVPcjTDVbRrIIlEKh4HAJaxXR-24RuXXmrLbViwn4VhBlmpo_0o-xtZbwq7QqIwoR79kq9weRsGr6doyBdgyFRorRew1DG9tB4svyj95UsGfX0g9QYg99p_pdCwdnKnvHoRfQ5PYoBkyusRhLC3FlXEBgSZQm1dnAASZf6qZX8KNhp0zgIf_Y6HVpEIgdlQOKXcXxym5h_AMNZmxtkLeKw";
const RSA_EXPONENT: &str = "AQAB";

pub const PRIMARY_KID: &str = "fixture-primary";
pub const SECONDARY_KID: &str = "fixture-secondary";

/// Signs ID tokens with a fixture RSA key.
#[derive(Clone)]
pub struct TestSigner {
    kid: String,
    algorithm: Algorithm,
    key: EncodingKey,
    modulus: &'static str,
}

impl TestSigner {
    fn from_pem(pem: &str, kid: &str, modulus: &'static str) -> Self {
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key parses");
        Self { kid: kid.to_string(), algorithm: Algorithm::RS256, key, modulus }
    }

    /// The key a test provider publishes by default.
    pub fn primary() -> Self {
        Self::from_pem(PRIMARY_PEM, PRIMARY_KID, PRIMARY_MODULUS)
    }

    /// A second key, used for rotation scenarios.
    pub fn secondary() -> Self {
        Self::from_pem(SECONDARY_PEM, SECONDARY_KID, SECONDARY_MODULUS)
    }

    /// The secondary private key presenting the primary key id. Its tokens
    /// resolve to a published key but fail signature verification.
    pub fn impostor() -> Self {
        Self::secondary().with_kid(PRIMARY_KID)
    }

    pub fn with_kid(mut self, kid: &str) -> Self {
        self.kid = kid.to_string();
        self
    }

    /// Any RSA algorithm (RS* or PS*).
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.kid.clone());
        encode(&header, claims, &self.key).expect("fixture token signs")
    }

    /// Sign with a header that carries no `kid`.
    pub fn sign_without_kid(&self, claims: &Value) -> String {
        encode(&Header::new(self.algorithm), claims, &self.key).expect("fixture token signs")
    }

    /// Public half of the key as a JWK.
    pub fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "use": "sig",
            "kid": self.kid,
            "alg": format!("{:?}", self.algorithm),
            "n": self.modulus,
            "e": RSA_EXPONENT,
        })
    }
}

/// JWKS document publishing the given signers.
pub fn jwks(signers: &[&TestSigner]) -> Value {
    json!({ "keys": signers.iter().map(|s| s.jwk()).collect::<Vec<_>>() })
}

/// Standard ID token claims issued at `issued_at` and valid for
/// `lifetime_secs`.
pub fn id_token_claims(
    issuer: &str,
    audience: &str,
    subject: &str,
    issued_at: DateTime<Utc>,
    lifetime_secs: i64,
) -> Value {
    let iat = issued_at.timestamp();
    json!({
        "iss": issuer,
        "aud": audience,
        "sub": subject,
        "iat": iat,
        "exp": iat + lifetime_secs,
        "email": format!("{subject}@example.test"),
        "preferred_username": subject,
    })
}
