//! `cookie-crypt` — keeps usernames out of auth cookies.
//!
//! The username element of a `username|expiration|token|hmac` cookie is
//! sealed with XChaCha20-Poly1305 when the cookie is issued and opened again,
//! through a process-local cache, when the cookie is parsed.
//!
//! Startup sequence for a host:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise logging with [`telemetry::init`].
//! 3. Build one [`DecodeCache`] for the process.
//! 4. Register [`CookieHooks`] with that cache and call them at the two
//!    cookie call sites.

pub mod cache;
pub mod config;
pub mod crypto;
pub mod field;
pub mod hooks;
pub mod telemetry;

pub use cache::DecodeCache;
pub use config::Config;
pub use crypto::{FieldCodec, SealedFieldCodec};
pub use field::{FailurePolicy, FieldError, FieldOrchestrator};
pub use hooks::{CookieHooks, CookieIssue};
