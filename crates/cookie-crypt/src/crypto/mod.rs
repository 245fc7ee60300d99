//! XChaCha20-Poly1305 field encryption primitives.
//!
//! This module is free of cookie-parsing and caching concerns. It provides key
//! normalisation, the low-level seal/open operations, and the [`FieldCodec`]
//! contract the orchestrator is written against.
//!
//! # Field format
//!
//! ```text
//! <marker><base64url-no-pad(nonce(24) ++ ciphertext ++ tag(16))>
//! ```
//!
//! The marker is a single reserved character (`:` by default) that can never
//! start a plaintext username, so plaintext and encrypted cookies can coexist
//! while a key is being rolled out.

pub mod cipher;
pub mod codec;
pub mod key;

pub use cipher::{DecodeError, EncodeError, KEY_LEN, NONCE_LEN};
pub use codec::{FieldCodec, SealedFieldCodec};
pub use key::{derive_key, SecretKey};

/// Marker used when none is configured.
pub const DEFAULT_MARKER: char = ':';
