//! The pluggable codec contract and its production implementation.

use super::cipher::{self, DecodeError, EncodeError};
use super::key::{derive_key, SecretKey};
use super::DEFAULT_MARKER;

/// Strategy for turning a username into an opaque cookie element and back.
///
/// The host registers one implementation at startup; the orchestrator only
/// ever talks to this trait.
#[cfg_attr(test, mockall::automock)]
pub trait FieldCodec: Send + Sync {
    /// Leading character that identifies an encoded element.
    fn marker(&self) -> char;

    /// Whether the codec has everything it needs (a key) to operate.
    fn is_available(&self) -> bool;

    /// Encode a plaintext username.
    fn encode(&self, plaintext: &str) -> Result<String, EncodeError>;

    /// Decode an element previously produced by [`FieldCodec::encode`].
    fn decode(&self, field: &str) -> Result<String, DecodeError>;
}

/// XChaCha20-Poly1305 codec keyed by the configured cookie secret.
///
/// Without a key both directions refuse to operate.
#[derive(Debug, Clone)]
pub struct SealedFieldCodec {
    key: Option<SecretKey>,
    marker: char,
}

impl SealedFieldCodec {
    pub fn new(key: SecretKey, marker: char) -> Self {
        Self {
            key: Some(key),
            marker,
        }
    }

    /// Build from the raw configured secret. An empty or absent secret
    /// yields an unavailable codec.
    pub fn from_secret(secret: Option<&[u8]>, marker: char) -> Self {
        Self {
            key: secret.filter(|s| !s.is_empty()).map(derive_key),
            marker,
        }
    }

    /// A codec with no key.
    pub fn disabled() -> Self {
        Self {
            key: None,
            marker: DEFAULT_MARKER,
        }
    }
}

impl FieldCodec for SealedFieldCodec {
    fn marker(&self) -> char {
        self.marker
    }

    fn is_available(&self) -> bool {
        self.key.is_some()
    }

    fn encode(&self, plaintext: &str) -> Result<String, EncodeError> {
        let key = self.key.as_ref().ok_or(EncodeError::Unavailable)?;
        cipher::encode(plaintext, key, self.marker)
    }

    fn decode(&self, field: &str) -> Result<String, DecodeError> {
        let key = self.key.as_ref().ok_or(DecodeError::Unavailable)?;
        cipher::decode(field, key, self.marker)
    }
}
