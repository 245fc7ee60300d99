//! Cookie wire format, failure taxonomy, and errors shared across the auth-cookie crates.

pub mod error;
pub mod protocol;

pub use error::{CookieError, FailureKind};
pub use protocol::{AuthCookie, AuthScheme, ParsedCookie};
