//! Label table for unit enums
//!
//! Claim names are rendered in logs and error messages and parsed back in
//! tests; one table drives both directions.
//!
//! # Example
//!
//! ```rust
//! use ssogate_domain::impl_domain_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Stage {
//!     Pending,
//!     Done,
//! }
//!
//! impl_domain_label_conversions!(Stage {
//!     Pending => "pending",
//!     Done => "done",
//! });
//!
//! assert_eq!(Stage::Done.to_string(), "done");
//! assert_eq!("PENDING".parse::<Stage>().unwrap(), Stage::Pending);
//! ```

/// Gives a unit-only enum a fixed wire label.
///
/// Generates `as_str`, `Display` and a case-insensitive `FromStr` whose error
/// names the enum and the rejected input.
#[macro_export]
macro_rules! impl_domain_label_conversions {
    ($enum_name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $enum_name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                $(if raw.eq_ignore_ascii_case($label) {
                    return Ok(Self::$variant);
                })+
                Err(format!("Invalid {}: {}", stringify!($enum_name), raw))
            }
        }
    };
}
