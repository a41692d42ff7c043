//! # ssogate Domain
//!
//! Data types shared by every ssogate crate.
//!
//! This crate contains:
//! - Provider, login-attempt, token, claim and session records
//! - The flow error taxonomy and the crate-wide error type
//! - Application configuration structures
//! - The `Secret` wrapper used for codes, verifiers and tokens
//!
//! ## Architecture
//! - No dependencies on other ssogate crates
//! - Only external dependencies allowed
//! - Pure data structures and their invariants

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod secret;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use secret::Secret;
pub use types::*;
