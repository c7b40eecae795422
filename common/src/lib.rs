//! Shared primitives for the Bitfocus Listener client.
//!
//! This crate holds the small pieces every other crate in the workspace leans on:
//!
//! - [`ErrorLocation`]: call-site capture for every error variant
//! - [`RedactedSecret`]: the shared authentication secret, never logged
//!
//! It has no knowledge of the connection protocol itself.

pub mod error;
pub mod redacted_secret;


pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;
