//! [`FieldOrchestrator`]: the encrypt-on-write / decrypt-on-read policy layer.
//!
//! # Failure policy
//!
//! Under [`FailurePolicy::PassThrough`] (the default) no failure ever reaches
//! the caller:
//!
//! - if the username cannot be encrypted, the cookie is issued with the
//!   username in plaintext;
//! - if an encrypted username cannot be decrypted, the *original encoded
//!   string* is handed back as if it were the username.
//!
//! The second behaviour means identity resolution downstream receives a
//! marker-prefixed string it will not recognise as a user. Whether every host
//! treats that as "unknown user" is not established; hosts that cannot rely on
//! it should run with [`FailurePolicy::Reject`].

use std::sync::Arc;

use common::{protocol::ELEMENT_COUNT, FailureKind};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cache::DecodeCache;
use crate::crypto::FieldCodec;

/// What to do when encryption or decryption of a username fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the original string and carry on.
    #[default]
    PassThrough,
    /// Surface the failure so the host can refuse the cookie.
    Reject,
}

/// Errors returned by the orchestrator under [`FailurePolicy::Reject`].
///
/// Decode-time failures are collapsed into one variant so callers cannot
/// distinguish a malformed element from one that failed authentication.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The codec has no key or its primitives are unavailable.
    #[error("cookie encryption unavailable")]
    Unavailable,

    /// The encrypted username could not be decrypted.
    #[error("cookie username cannot be decrypted")]
    Undecryptable,
}

impl From<FailureKind> for FieldError {
    fn from(kind: FailureKind) -> Self {
        if kind.is_decode_failure() {
            Self::Undecryptable
        } else {
            Self::Unavailable
        }
    }
}

/// Wires a [`FieldCodec`] and a [`DecodeCache`] into the two cookie call sites.
#[derive(Clone)]
pub struct FieldOrchestrator {
    codec: Arc<dyn FieldCodec>,
    cache: DecodeCache,
    policy: FailurePolicy,
}

impl FieldOrchestrator {
    pub fn new(codec: Arc<dyn FieldCodec>, cache: DecodeCache, policy: FailurePolicy) -> Self {
        Self {
            codec,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    /// Replace the username element (`fields[0]`) with its encoded form.
    ///
    /// # Errors
    ///
    /// Only under [`FailurePolicy::Reject`]: returns [`FieldError::Unavailable`]
    /// when the codec cannot encode. Under the default policy the fields come
    /// back unchanged instead.
    pub fn encrypt_field(
        &self,
        mut fields: [String; ELEMENT_COUNT],
    ) -> Result<[String; ELEMENT_COUNT], FieldError> {
        match self.codec.encode(&fields[0]) {
            Ok(encoded) => {
                fields[0] = encoded;
                Ok(fields)
            }
            Err(e) => {
                // The username itself never goes into the event.
                error!(kind = %e.kind(), "failed to encrypt cookie username");
                match self.policy {
                    FailurePolicy::PassThrough => Ok(fields),
                    FailurePolicy::Reject => Err(e.kind().into()),
                }
            }
        }
    }

    /// Resolve a cookie's username element to the plaintext username.
    ///
    /// Strings without the codec's marker are plaintext and come back
    /// unchanged. Encoded strings are served from the cache when possible;
    /// otherwise they are decoded and, on success, cached.
    ///
    /// # Errors
    ///
    /// Only under [`FailurePolicy::Reject`]. Under the default policy a failed
    /// decode returns `raw` unchanged.
    pub fn decrypt_username(&self, raw: &str) -> Result<String, FieldError> {
        if !raw.starts_with(self.codec.marker()) {
            return Ok(raw.to_owned());
        }

        if let Some(hit) = self.cache.lookup(raw) {
            return Ok(hit);
        }

        match self.codec.decode(raw) {
            Ok(plaintext) => {
                self.cache.insert(raw, &plaintext);
                Ok(plaintext)
            }
            Err(e) => {
                debug!(kind = %e.kind(), "cookie username decode failed");
                match self.policy {
                    FailurePolicy::PassThrough => Ok(raw.to_owned()),
                    FailurePolicy::Reject => {
                        let err = FieldError::from(e.kind());
                        warn!(error = %err, "rejecting auth cookie");
                        Err(err)
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for FieldOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldOrchestrator")
            .field("marker", &self.codec.marker())
            .field("available", &self.codec.is_available())
            .field("cache", &self.cache.capacity())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::codec::MockFieldCodec;
    use crate::crypto::{derive_key, DecodeError, EncodeError, SealedFieldCodec};

    fn fields(username: &str) -> [String; ELEMENT_COUNT] {
        [
            username.to_owned(),
            "1700000000".to_owned(),
            "tok123".to_owned(),
            "hmacabc".to_owned(),
        ]
    }

    fn sealed(policy: FailurePolicy) -> FieldOrchestrator {
        let codec = SealedFieldCodec::new(derive_key(b"mysecret"), ':');
        FieldOrchestrator::new(Arc::new(codec), DecodeCache::new(), policy)
    }

    fn mock_with_marker() -> MockFieldCodec {
        let mut codec = MockFieldCodec::new();
        codec.expect_marker().return_const(':');
        codec.expect_is_available().return_const(true);
        codec
    }

    #[test]
    fn mysecret_scenario() {
        let orch = sealed(FailurePolicy::PassThrough);
        let out = orch.encrypt_field(fields("alice")).unwrap();
        assert!(out[0].starts_with(':'));
        assert_eq!(&out[1..], &fields("alice")[1..]);
        assert_eq!(orch.decrypt_username(&out[0]).unwrap(), "alice");
        assert_eq!(orch.decrypt_username("alice").unwrap(), "alice");
    }

    #[test]
    fn plaintext_is_passed_through_without_decoding() {
        let mut codec = mock_with_marker();
        codec.expect_decode().never();
        let orch = FieldOrchestrator::new(
            Arc::new(codec),
            DecodeCache::new(),
            FailurePolicy::Reject,
        );
        for raw in ["alice", "", "bob:colon", "user@example.com"] {
            assert_eq!(orch.decrypt_username(raw).unwrap(), raw);
        }
        assert!(orch.cache().is_empty());
    }

    #[test]
    fn second_decrypt_is_served_from_cache() {
        let mut codec = mock_with_marker();
        codec
            .expect_decode()
            .times(1)
            .returning(|_| Ok("alice".to_owned()));
        let orch = FieldOrchestrator::new(
            Arc::new(codec),
            DecodeCache::new(),
            FailurePolicy::PassThrough,
        );
        assert_eq!(orch.decrypt_username(":sealed").unwrap(), "alice");
        assert_eq!(orch.decrypt_username(":sealed").unwrap(), "alice");
        assert_eq!(orch.cache().len(), 1);
    }

    #[test]
    fn failed_decodes_are_not_cached() {
        let mut codec = mock_with_marker();
        codec
            .expect_decode()
            .times(2)
            .returning(|_| Err(DecodeError::AuthenticationFailed));
        let orch = FieldOrchestrator::new(
            Arc::new(codec),
            DecodeCache::new(),
            FailurePolicy::PassThrough,
        );
        assert_eq!(orch.decrypt_username(":forged").unwrap(), ":forged");
        assert_eq!(orch.decrypt_username(":forged").unwrap(), ":forged");
        assert!(orch.cache().is_empty());
    }

    #[test]
    fn undecryptable_username_passes_through_as_is() {
        let orch = sealed(FailurePolicy::PassThrough);
        let other = SealedFieldCodec::new(derive_key(b"another secret"), ':');
        let foreign = other.encode("mallory").unwrap();
        assert_eq!(orch.decrypt_username(&foreign).unwrap(), foreign);
        assert_eq!(orch.decrypt_username(":%%%").unwrap(), ":%%%");
    }

    #[test]
    fn reject_policy_collapses_decode_failures() {
        let orch = sealed(FailurePolicy::Reject);
        let other = SealedFieldCodec::new(derive_key(b"another secret"), ':');
        let foreign = other.encode("mallory").unwrap();
        assert_eq!(
            orch.decrypt_username(&foreign),
            Err(FieldError::Undecryptable)
        );
        assert_eq!(orch.decrypt_username(":%%%"), Err(FieldError::Undecryptable));
    }

    #[test]
    fn shared_cache_is_seen_by_other_orchestrators() {
        let cache = DecodeCache::new();
        let codec: Arc<dyn FieldCodec> =
            Arc::new(SealedFieldCodec::new(derive_key(b"mysecret"), ':'));
        let writer = FieldOrchestrator::new(codec.clone(), cache.clone(), FailurePolicy::default());
        let field = writer.encrypt_field(fields("heidi")).unwrap()[0].clone();
        writer.decrypt_username(&field).unwrap();

        let mut mock = mock_with_marker();
        mock.expect_decode().never();
        let reader = FieldOrchestrator::new(Arc::new(mock), cache, FailurePolicy::default());
        assert_eq!(reader.decrypt_username(&field).unwrap(), "heidi");
    }

    #[test]
    fn encode_failure_keeps_plaintext_under_pass_through() {
        let mut codec = mock_with_marker();
        codec
            .expect_encode()
            .returning(|_| Err(EncodeError::Unavailable));
        let orch = FieldOrchestrator::new(
            Arc::new(codec),
            DecodeCache::new(),
            FailurePolicy::PassThrough,
        );
        assert_eq!(orch.encrypt_field(fields("ivan")).unwrap(), fields("ivan"));
    }

    #[test]
    fn encode_failure_is_reported_under_reject() {
        let mut codec = mock_with_marker();
        codec
            .expect_encode()
            .returning(|_| Err(EncodeError::Unavailable));
        let orch = FieldOrchestrator::new(
            Arc::new(codec),
            DecodeCache::new(),
            FailurePolicy::Reject,
        );
        assert_eq!(
            orch.encrypt_field(fields("ivan")),
            Err(FieldError::Unavailable)
        );
    }

    #[test]
    fn unavailable_codec_passes_everything_through() {
        let orch = FieldOrchestrator::new(
            Arc::new(SealedFieldCodec::disabled()),
            DecodeCache::new(),
            FailurePolicy::PassThrough,
        );
        assert_eq!(orch.encrypt_field(fields("judy")).unwrap(), fields("judy"));
        assert_eq!(orch.decrypt_username(":abcd").unwrap(), ":abcd");
    }

    #[test]
    fn each_encryption_differs() {
        let orch = sealed(FailurePolicy::PassThrough);
        let a = orch.encrypt_field(fields("ken")).unwrap();
        let b = orch.encrypt_field(fields("ken")).unwrap();
        assert_ne!(a[0], b[0]);
        assert_eq!(orch.decrypt_username(&a[0]).unwrap(), "ken");
        assert_eq!(orch.decrypt_username(&b[0]).unwrap(), "ken");
    }

    #[test]
    fn field_error_from_kind() {
        assert_eq!(
            FieldError::from(FailureKind::Malformed),
            FieldError::Undecryptable
        );
        assert_eq!(
            FieldError::from(FailureKind::AuthenticationFailed),
            FieldError::Undecryptable
        );
        assert_eq!(
            FieldError::from(FailureKind::ConfigurationUnavailable),
            FieldError::Unavailable
        );
    }

    #[test]
    fn debug_hides_codec_internals() {
        let orch = sealed(FailurePolicy::Reject);
        let s = format!("{orch:?}");
        assert!(s.contains("Reject"));
        assert!(!s.contains("mysecret"));
    }
}
