//! Configuration loading and validation for cookie encryption.
//!
//! All values are read from environment variables at startup. A missing
//! `AUTH_COOKIE_KEY` is not an error: it disables encryption and cookies pass
//! through unchanged.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::DEFAULT_MARKER;
use crate::field::FailurePolicy;

/// Validated cookie-encryption configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Secret of any length; normalised to a 32-byte key. Absent or empty
    /// disables encryption.
    ///
    /// Environment values are text, so the secret is the UTF-8 encoding of
    /// this string. A key that is not valid UTF-8 cannot be configured; use a
    /// printable secret (a hex or base64 string works, taken as-is).
    #[serde(default)]
    pub auth_cookie_key: Option<String>,

    /// Single reserved character that marks an encrypted username.
    #[serde(default = "default_encryption_prefix")]
    pub encryption_prefix: String,

    /// Behaviour when encryption or decryption fails.
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Upper bound on cached decodes. Absent means unbounded.
    #[serde(default)]
    pub decode_cache_capacity: Option<u64>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_encryption_prefix() -> String {
    DEFAULT_MARKER.to_string()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::default())
    }

    /// Load and validate configuration from any `config` source.
    pub fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The configured secret, if encryption is enabled.
    pub fn secret(&self) -> Option<&[u8]> {
        self.auth_cookie_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::as_bytes)
    }

    /// The validated marker character.
    pub fn marker(&self) -> char {
        self.encryption_prefix.chars().next().unwrap_or(DEFAULT_MARKER)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        let mut chars = self.encryption_prefix.chars();
        let marker = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => anyhow::bail!("ENCRYPTION_PREFIX must be exactly one character"),
        };
        if marker == common::protocol::DELIMITER {
            anyhow::bail!("ENCRYPTION_PREFIX must not be the cookie delimiter '|'");
        }
        if marker.is_whitespace() || marker.is_control() || marker.is_ascii_alphanumeric() {
            anyhow::bail!(
                "ENCRYPTION_PREFIX must not be whitespace, a control character, or alphanumeric"
            );
        }
        if self.decode_cache_capacity == Some(0) {
            anyhow::bail!("DECODE_CACHE_CAPACITY must be > 0 when set");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "auth_cookie_key",
                &self.secret().map(|_| "[REDACTED]"),
            )
            .field("encryption_prefix", &self.encryption_prefix)
            .field("on_failure", &self.on_failure)
            .field("decode_cache_capacity", &self.decode_cache_capacity)
            .field("log_level", &self.log_level)
            .finish()
    }
}
