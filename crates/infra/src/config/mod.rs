//! Configuration sources
//!
//! Environment variables are tried first; when a required one is missing the
//! file named by `SSOGATE_CONFIG`, or the first one found by
//! [`probe_config_paths`], is parsed. Either way the result is validated.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
