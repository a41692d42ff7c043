//! Random values used by the authorization-code flow.

pub mod pkce;

pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_session_id, generate_state, PkcePair,
};
