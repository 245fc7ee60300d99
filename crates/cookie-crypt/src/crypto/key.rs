//! [`SecretKey`] and normalisation of the configured secret into one.

use sha2::{Digest, Sha256};

use super::cipher::KEY_LEN;

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// Built once at startup and read-only afterwards. When this type is dropped
/// the memory is overwritten with zeroes.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Box<[u8; KEY_LEN]>);

impl SecretKey {
    /// Wrap raw key bytes that already have the cipher's key length.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Normalise an externally configured secret into a [`SecretKey`].
///
/// A secret that is already [`KEY_LEN`] bytes long is used verbatim. Anything
/// else is replaced by its SHA-256 digest, which is exactly [`KEY_LEN`] bytes.
pub fn derive_key(secret: &[u8]) -> SecretKey {
    let mut buf = [0u8; KEY_LEN];
    if secret.len() == KEY_LEN {
        buf.copy_from_slice(secret);
    } else {
        buf.copy_from_slice(&Sha256::digest(secret));
    }
    SecretKey::from_bytes(buf)
}
