//! The two host call sites: cookie construction and cookie parsing.
//!
//! A host builds one [`CookieHooks`] at startup and calls
//! [`CookieHooks::encrypt_auth_cookie`] whenever it issues an auth cookie and
//! [`CookieHooks::parse_auth_cookie`] before it resolves a cookie to a user.
//! With no key configured both calls leave the username untouched.

use std::sync::Arc;

use common::{AuthCookie, AuthScheme, ParsedCookie};
use tracing::{debug, info, warn};

use crate::cache::DecodeCache;
use crate::config::Config;
use crate::crypto::{FieldCodec, SealedFieldCodec};
use crate::field::{FailurePolicy, FieldError, FieldOrchestrator};

/// A cookie the host is about to issue.
///
/// Expiration and token travel inside `cookie` and are carried through
/// untouched.
#[derive(Debug, Clone, Copy)]
pub struct CookieIssue<'a> {
    /// The `username|expiration|token|hmac` value the host built.
    pub cookie: &'a str,
    pub user_id: u64,
    pub scheme: AuthScheme,
}

/// Registered cookie call sites. Disabled when no key is configured.
#[derive(Debug, Clone)]
pub struct CookieHooks {
    orchestrator: Option<FieldOrchestrator>,
}

impl CookieHooks {
    /// Build the hooks from validated configuration, sharing `cache`.
    pub fn register(cfg: &Config, cache: DecodeCache) -> Self {
        let codec = SealedFieldCodec::from_secret(cfg.secret(), cfg.marker());
        Self::with_codec(Arc::new(codec), cache, cfg.on_failure)
    }

    /// Build the hooks around any [`FieldCodec`].
    ///
    /// An unavailable codec leaves the hooks disabled and logs a warning in
    /// place of an operator notice.
    pub fn with_codec(
        codec: Arc<dyn FieldCodec>,
        cache: DecodeCache,
        policy: FailurePolicy,
    ) -> Self {
        if !codec.is_available() {
            warn!("AUTH_COOKIE_KEY is not set; auth cookie usernames will not be encrypted");
            return Self { orchestrator: None };
        }
        info!(
            marker = %codec.marker(),
            cache_capacity = ?cache.capacity(),
            policy = ?policy,
            "auth cookie encryption enabled"
        );
        Self {
            orchestrator: Some(FieldOrchestrator::new(codec, cache, policy)),
        }
    }

    /// Hooks that never touch a cookie.
    pub fn disabled() -> Self {
        Self { orchestrator: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.orchestrator.is_some()
    }

    pub fn orchestrator(&self) -> Option<&FieldOrchestrator> {
        self.orchestrator.as_ref()
    }

    /// Encrypt the username element of a cookie the host is about to issue.
    ///
    /// Values that do not split into four elements are returned unchanged.
    ///
    /// # Errors
    ///
    /// Only under [`FailurePolicy::Reject`], when the username cannot be
    /// encrypted.
    pub fn encrypt_auth_cookie(&self, issue: CookieIssue<'_>) -> Result<String, FieldError> {
        let Some(orchestrator) = &self.orchestrator else {
            return Ok(issue.cookie.to_owned());
        };

        let cookie = match AuthCookie::parse(issue.cookie) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, user_id = issue.user_id, "not encrypting malformed auth cookie");
                return Ok(issue.cookie.to_owned());
            }
        };

        let expiration = cookie.expiration.clone();
        let fields = orchestrator.encrypt_field(cookie.into_fields())?;
        let encrypted = AuthCookie::from_fields(fields).to_string();

        debug!(
            user_id = issue.user_id,
            scheme = %issue.scheme,
            %expiration,
            original_length = issue.cookie.len(),
            encrypted_length = encrypted.len(),
            "auth cookie issued"
        );
        Ok(encrypted)
    }

    /// Split a cookie value and resolve its username through the decryption
    /// layer.
    ///
    /// Returns `None` if the value does not have exactly four elements, or if
    /// the username is rejected under [`FailurePolicy::Reject`].
    pub fn parse_auth_cookie(&self, cookie: &str, scheme: AuthScheme) -> Option<ParsedCookie> {
        let mut parsed = AuthCookie::parse(cookie).ok()?;
        if let Some(orchestrator) = &self.orchestrator {
            parsed.username = orchestrator.decrypt_username(&parsed.username).ok()?;
        }
        Some(ParsedCookie::new(parsed, scheme))
    }
}
