//! Testing utilities and helpers
//!
//! - [`tokens`]: RSA fixture keys, ID token signing and matching JWKS
//!   documents
//!
//! Enabled by the `test-utils` feature; downstream crates pull it in through
//! their dev-dependencies.

pub mod tokens;

pub use tokens::{id_token_claims, jwks, TestSigner, PRIMARY_KID, SECONDARY_KID};
