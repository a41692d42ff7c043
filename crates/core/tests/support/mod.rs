//! Shared test helpers for `ssogate-core` integration tests.
//!
//! In-memory ports and a scripted provider so tests can focus on flow
//! behaviour instead of plumbing.

#![allow(dead_code)]

pub mod fixtures;
pub mod ports;
