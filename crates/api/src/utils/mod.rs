pub mod cookies;
pub mod logging;
