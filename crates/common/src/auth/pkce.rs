//! PKCE (RFC 7636) and opaque random values for the login flow
//!
//! Every value here is drawn from the operating system RNG and encoded as
//! unpadded base64url, so it can be placed in a query string or cookie
//! without further escaping.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes behind verifiers, state nonces and session ids (256 bits).
const RANDOM_BYTES: usize = 32;

fn random_urlsafe() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a code verifier: 32 random bytes, 43 characters.
pub fn generate_code_verifier() -> String {
    random_urlsafe()
}

/// BASE64URL(SHA256(ASCII(code_verifier)))
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a state nonce binding an authorization request to its callback.
pub fn generate_state() -> String {
    random_urlsafe()
}

/// Generate an opaque session identifier.
pub fn generate_session_id() -> String {
    random_urlsafe()
}

/// Verifier and S256 challenge generated together.
#[derive(Clone)]
pub struct PkcePair {
    /// Kept server-side until the token exchange.
    pub code_verifier: String,
    /// Sent in the authorization request.
    pub code_challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        Self { code_verifier, code_challenge }
    }

    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

impl std::fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkcePair")
            .field("code_verifier", &"***")
            .field("code_challenge", &self.code_challenge)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    /// Validates `PkcePair::generate` output against the RFC 7636 length
    /// limits.
    #[test]
    fn test_generate_pkce_pair() {
        let pair = PkcePair::generate();

        assert!(pair.code_verifier.len() >= 43, "verifier too short");
        assert!(pair.code_verifier.len() <= 128, "verifier too long");
        assert_eq!(pair.code_challenge.len(), 43);
        assert_eq!(pair.challenge_method(), "S256");
    }

    #[test]
    fn test_rfc7636_appendix_b_vector() {
        let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    /// Assertions:
    /// - No padding and no characters outside the base64url alphabet.
    #[test]
    fn test_values_are_urlsafe() {
        let pair = PkcePair::generate();
        for value in [&pair.code_verifier, &pair.code_challenge, &generate_state()] {
            assert!(!value.contains('='));
            assert!(value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_state_carries_at_least_128_bits() {
        let state = generate_state();
        let decoded = URL_SAFE_NO_PAD.decode(&state).expect("state decodes");
        assert!(decoded.len() * 8 >= 128);
    }

    #[test]
    fn test_debug_hides_verifier() {
        let pair = PkcePair::generate();
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains(&pair.code_verifier));
        assert!(rendered.contains(&pair.code_challenge));
    }

    #[test]
    fn test_session_ids_differ() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
