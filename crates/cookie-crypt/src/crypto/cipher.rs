//! XChaCha20-Poly1305 sealing and opening of a single cookie element.
//!
//! **Algorithm choice:** XChaCha20-Poly1305 takes a 192-bit nonce, which is
//! large enough that nonces drawn from the OS CSPRNG for every call will not
//! collide under one key in practice. No explicit reuse check is made.
//!
//! The encoded form is `marker + base64url_nopad(nonce ++ ciphertext+tag)`.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use chacha20poly1305::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Key, XChaCha20Poly1305, XNonce,
};
use common::FailureKind;
use thiserror::Error;

use super::key::SecretKey;

/// Byte length of an XChaCha20-Poly1305 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an XChaCha20 nonce (24 bytes = 192 bits).
pub const NONCE_LEN: usize = 24;

/// Byte length of the Poly1305 authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// URL-safe alphabet; omits padding on encode, accepts it either way on decode.
const FIELD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors produced when sealing a value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The CSPRNG or the cipher could not be used.
    #[error("cipher or random source unavailable")]
    Unavailable,
}

impl EncodeError {
    pub fn kind(self) -> FailureKind {
        FailureKind::ConfigurationUnavailable
    }
}

/// Errors produced when opening a value.
///
/// [`DecodeError::Malformed`] and [`DecodeError::AuthenticationFailed`] are
/// kept apart for diagnostics only. Callers must not branch on which one
/// occurred.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The value does not start with the marker.
    #[error("value is not an encrypted field")]
    NotEncoded,

    /// Bad base64, fewer than [`NONCE_LEN`] decoded bytes, or non-UTF-8 plaintext.
    #[error("malformed encrypted field")]
    Malformed,

    /// The Poly1305 tag did not verify.
    #[error("encrypted field failed authentication")]
    AuthenticationFailed,

    /// No key is configured.
    #[error("cipher unavailable")]
    Unavailable,
}

impl DecodeError {
    pub fn kind(self) -> FailureKind {
        match self {
            Self::NotEncoded | Self::Malformed => FailureKind::Malformed,
            Self::AuthenticationFailed => FailureKind::AuthenticationFailed,
            Self::Unavailable => FailureKind::ConfigurationUnavailable,
        }
    }
}

/// Seal `plaintext` under `key` and return the marker-prefixed text form.
///
/// A fresh nonce is drawn from the OS CSPRNG on every call.
///
/// # Errors
///
/// Returns [`EncodeError::Unavailable`] if the random source fails or the
/// AEAD refuses the input (unreachable for cookie-sized plaintexts).
pub fn encode(plaintext: &str, key: &SecretKey, marker: char) -> Result<String, EncodeError> {
    let cipher = build_cipher(key);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|_| EncodeError::Unavailable)?;

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| EncodeError::Unavailable)?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);

    let mut out = String::with_capacity(marker.len_utf8() + (sealed.len() * 4).div_ceil(3));
    out.push(marker);
    FIELD_ENGINE.encode_string(&sealed, &mut out);
    Ok(out)
}

/// Open a marker-prefixed field produced by [`encode`].
///
/// # Errors
///
/// - [`DecodeError::NotEncoded`] if `field` does not start with `marker`.
/// - [`DecodeError::Malformed`] on invalid base64, a decoded length shorter
///   than [`NONCE_LEN`], or plaintext that is not UTF-8.
/// - [`DecodeError::AuthenticationFailed`] on tag mismatch (tampering, wrong
///   key, truncation).
pub fn decode(field: &str, key: &SecretKey, marker: char) -> Result<String, DecodeError> {
    let encoded = field.strip_prefix(marker).ok_or(DecodeError::NotEncoded)?;

    let data = FIELD_ENGINE
        .decode(encoded)
        .map_err(|_| DecodeError::Malformed)?;
    if data.len() < NONCE_LEN {
        return Err(DecodeError::Malformed);
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LEN);

    let plaintext = build_cipher(key)
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecodeError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| DecodeError::Malformed)
}

fn build_cipher(key: &SecretKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}
