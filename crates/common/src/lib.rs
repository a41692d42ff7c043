//! Common utilities shared across ssogate crates.
//!
//! - `auth`: PKCE pairs, state nonces and session identifiers
//! - `time`: wall-clock abstraction with a controllable mock
//! - `testing` (feature `test-utils`): fixture signing keys and token helpers

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::pkce::{generate_session_id, generate_state, PkcePair};
pub use time::{Clock, MockClock, SystemClock};
