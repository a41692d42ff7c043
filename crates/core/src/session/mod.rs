//! Application sessions created from validated logins

pub mod binder;
pub mod ports;

pub use binder::SessionBinder;
