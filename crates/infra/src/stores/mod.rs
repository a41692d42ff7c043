//! In-process implementations of the core storage ports

pub mod auth_requests;
pub mod sessions;

pub use auth_requests::PendingRequestCache;
pub use sessions::InMemorySessionStore;
