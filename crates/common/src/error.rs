//! Common error types shared across crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The failure taxonomy every layer of the codec reports onto.
///
/// Callers that act on a failure must not branch on
/// [`FailureKind::Malformed`] versus [`FailureKind::AuthenticationFailed`];
/// use [`FailureKind::is_decode_failure`] instead. The distinction exists for
/// diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No secret is configured, or a required primitive (cipher, RNG) is absent.
    ConfigurationUnavailable,

    /// Wrong marker, invalid text encoding, or too few decoded bytes.
    Malformed,

    /// MAC verification failed: tampering, wrong key, or truncation.
    AuthenticationFailed,
}

impl FailureKind {
    /// `true` for the two decode-time kinds that callers must treat as one
    /// "cannot decrypt" outcome.
    pub fn is_decode_failure(self) -> bool {
        matches!(self, Self::Malformed | Self::AuthenticationFailed)
    }

    /// Short machine-readable code, safe for logs and error responses.
    pub fn code(self) -> &'static str {
        match self {
            Self::ConfigurationUnavailable => "configuration_unavailable",
            Self::Malformed => "malformed",
            Self::AuthenticationFailed => "authentication_failed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors produced while handling the cookie wire format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieError {
    /// The cookie did not split into exactly four `|`-delimited elements.
    #[error("auth cookie must have 4 elements, got {0}")]
    WrongElementCount(usize),

    /// The scheme name is not one of `auth`, `secure_auth`, `logged_in`.
    #[error("unknown auth scheme: {0}")]
    UnknownScheme(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_grouped() {
        assert!(FailureKind::Malformed.is_decode_failure());
        assert!(FailureKind::AuthenticationFailed.is_decode_failure());
        assert!(!FailureKind::ConfigurationUnavailable.is_decode_failure());
    }

    #[test]
    fn codes_match_serde_names() {
        for kind in [
            FailureKind::ConfigurationUnavailable,
            FailureKind::Malformed,
            FailureKind::AuthenticationFailed,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.code()));
        }
    }

    #[test]
    fn display_includes_count() {
        let e = CookieError::WrongElementCount(3);
        assert!(e.to_string().contains('3'));
    }
}
