//! OpenID Connect relying-party components

pub mod jwks;
pub mod ports;
pub mod request_builder;
pub mod token_exchanger;
pub mod token_validator;

pub use jwks::JwksCache;
pub use request_builder::RequestBuilder;
pub use token_exchanger::TokenExchanger;
pub use token_validator::TokenValidator;
