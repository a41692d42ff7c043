//! Time abstraction for testability
//!
//! Token expiry, state TTLs and the JWKS refresh floor are all evaluated
//! against a [`Clock`], so tests can move time forward without sleeping.
//!
//! ```
//! use chrono::Duration;
//! use ssogate_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::seconds(5));
//! assert_eq!(clock.now() - start, Duration::seconds(5));
//! ```

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
