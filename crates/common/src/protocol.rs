//! The auth-cookie wire format and the response types the tooling prints.
//!
//! An auth cookie value is four `|`-delimited elements:
//!
//! ```text
//! username|expiration|token|hmac
//! ```
//!
//! Only `username` is ever rewritten by the encryption layer; the other three
//! elements are carried through byte-for-byte.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CookieError;

/// Element delimiter inside an auth cookie value.
pub const DELIMITER: char = '|';

/// Number of elements in a well-formed auth cookie.
pub const ELEMENT_COUNT: usize = 4;

// ---------------------------------------------------------------------------
// Cookie value
// ---------------------------------------------------------------------------

/// A split auth cookie value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCookie {
    /// Plaintext or encrypted username.
    pub username: String,
    /// Expiration timestamp, opaque to this crate.
    pub expiration: String,
    /// Session token, opaque to this crate.
    pub token: String,
    /// HMAC over the other elements, opaque to this crate.
    pub hmac: String,
}

impl AuthCookie {
    /// Split a raw cookie value into its four elements.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError::WrongElementCount`] unless the value contains
    /// exactly three delimiters.
    pub fn parse(cookie: &str) -> Result<Self, CookieError> {
        let elements: Vec<&str> = cookie.split(DELIMITER).collect();
        match elements.as_slice() {
            [username, expiration, token, hmac] => Ok(Self {
                username: (*username).to_owned(),
                expiration: (*expiration).to_owned(),
                token: (*token).to_owned(),
                hmac: (*hmac).to_owned(),
            }),
            other => Err(CookieError::WrongElementCount(other.len())),
        }
    }

    /// The elements in wire order.
    pub fn into_fields(self) -> [String; ELEMENT_COUNT] {
        [self.username, self.expiration, self.token, self.hmac]
    }

    /// Rebuild a cookie from elements in wire order.
    pub fn from_fields(fields: [String; ELEMENT_COUNT]) -> Self {
        let [username, expiration, token, hmac] = fields;
        Self {
            username,
            expiration,
            token,
            hmac,
        }
    }
}

impl fmt::Display for AuthCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            self.username, self.expiration, self.token, self.hmac
        )
    }
}

// ---------------------------------------------------------------------------
// Scheme
// ---------------------------------------------------------------------------

/// Which auth cookie a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    Auth,
    SecureAuth,
    LoggedIn,
}

impl AuthScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::SecureAuth => "secure_auth",
            Self::LoggedIn => "logged_in",
        }
    }
}

impl FromStr for AuthScheme {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(Self::Auth),
            "secure_auth" => Ok(Self::SecureAuth),
            "logged_in" => Ok(Self::LoggedIn),
            other => Err(CookieError::UnknownScheme(other.to_owned())),
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Parsed cookie
// ---------------------------------------------------------------------------

/// Result of parsing an auth cookie, with the username already resolved
/// through the decryption layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCookie {
    pub username: String,
    pub expiration: String,
    pub token: String,
    pub hmac: String,
    pub scheme: AuthScheme,
}

impl ParsedCookie {
    /// Attach a scheme to a split cookie.
    pub fn new(cookie: AuthCookie, scheme: AuthScheme) -> Self {
        Self {
            username: cookie.username,
            expiration: cookie.expiration,
            token: cookie.token,
            hmac: cookie.hmac,
            scheme,
        }
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error line printed by the tooling for a request it could not serve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description, never containing key material.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_four_elements() {
        let c = AuthCookie::parse("alice|1700000000|tok123|hmacabc").unwrap();
        assert_eq!(c.username, "alice");
        assert_eq!(c.expiration, "1700000000");
        assert_eq!(c.token, "tok123");
        assert_eq!(c.hmac, "hmacabc");
    }

    #[test]
    fn parse_rejects_wrong_count() {
        assert_eq!(
            AuthCookie::parse("alice|1700000000|tok123"),
            Err(CookieError::WrongElementCount(3))
        );
        assert_eq!(
            AuthCookie::parse("a|b|c|d|e"),
            Err(CookieError::WrongElementCount(5))
        );
        assert_eq!(AuthCookie::parse(""), Err(CookieError::WrongElementCount(1)));
    }

    #[test]
    fn display_rejoins_elements() {
        let raw = "alice|1700000000|tok123|hmacabc";
        assert_eq!(AuthCookie::parse(raw).unwrap().to_string(), raw);
    }

    #[test]
    fn empty_elements_survive() {
        let raw = "|||";
        let c = AuthCookie::parse(raw).unwrap();
        assert!(c.username.is_empty());
        assert_eq!(c.to_string(), raw);
    }

    #[test]
    fn scheme_from_str() {
        assert_eq!("logged_in".parse::<AuthScheme>().unwrap(), AuthScheme::LoggedIn);
        assert!("cookie".parse::<AuthScheme>().is_err());
    }

    #[test]
    fn parsed_cookie_serialises_scheme_snake_case() {
        let c = AuthCookie::parse("alice|1|t|h").unwrap();
        let parsed = ParsedCookie::new(c, AuthScheme::SecureAuth);
        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(
            value,
            json!({
                "username": "alice",
                "expiration": "1",
                "token": "t",
                "hmac": "h",
                "scheme": "secure_auth"
            })
        );
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "unknown command");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("unknown command"));
    }
}
