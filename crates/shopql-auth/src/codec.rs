//! Building, signing and parsing shop tokens.

use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Header, decode_header, encode};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::hooks::TokenHooks;
use crate::keys::KeyRegistry;
use crate::legacy::UserIdentity;
use crate::token::{Token, TokenBuilder};

/// Issues signed tokens and parses presented ones.
#[derive(Clone)]
pub struct TokenCodec {
    keys: Arc<dyn KeyRegistry>,
    config: AuthConfig,
}

impl TokenCodec {
    /// Codec signing with keys from `keys`.
    pub fn new(keys: Arc<dyn KeyRegistry>, config: &AuthConfig) -> Self {
        Self {
            keys,
            config: config.clone(),
        }
    }

    /// Build and sign a token for a freshly authenticated user.
    ///
    /// Issuer and audience are `shop_url`; the token is usable from `now`
    /// for the configured lifetime. `hooks` run after the shop claims are
    /// set and before the key is fetched. A key whose algorithm differs from
    /// the configured one is a [`AuthError::Config`] error.
    pub fn issue(
        &self,
        username: &str,
        identity: &UserIdentity,
        shop_url: &str,
        shop_id: i64,
        now: DateTime<Utc>,
        hooks: &TokenHooks,
    ) -> Result<Token> {
        let mut builder = TokenBuilder::new();
        builder
            .issued_by(shop_url)
            .permitted_for(shop_url)
            .issued_at(now)
            .can_only_be_used_after(now)
            .expires_at(now + self.config.token_lifetime())
            .shop_claims(shop_id, username, &identity.user_id);

        hooks.dispatch(&mut builder, identity)?;

        let key = self.keys.signing_key()?;
        self.config.check_algorithm(key.algorithm())?;
        let header = Header::new(key.algorithm());
        let claims = builder.into_claims();
        let raw = encode(&header, &claims, key.encoding_key())
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        log::info!(
            "Issued token for user '{}' on shop {shop_id}, expires at {}",
            identity.user_id,
            claims.exp
        );

        Ok(Token::new(raw, header, claims))
    }

    /// Parse a compact token without verifying it.
    ///
    /// No input, or only whitespace, means no token was presented and yields
    /// `Ok(None)`. Anything else must parse or fails with
    /// [`AuthError::MalformedToken`].
    pub fn decode(raw: Option<&str>) -> Result<Option<Token>> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        let header = decode_header(raw).map_err(|e| AuthError::MalformedToken(e.to_string()))?;

        let mut segments = raw.split('.');
        let (Some(_), Some(payload), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;
        let claims: Claims = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedToken(format!("unreadable claims: {e}")))?;

        log::debug!("Decoded {:?} token for user '{}'", header.alg, claims.userid);

        Ok(Some(Token::new(raw.to_string(), header, claims)))
    }

    /// Parse the token of an `Authorization: Bearer <token>` header value.
    ///
    /// A missing header or another scheme yields `Ok(None)`.
    pub fn decode_bearer(authorization: Option<&str>) -> Result<Option<Token>> {
        Self::decode(authorization.and_then(bearer_token))
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime", &self.config.token_lifetime())
            .field("algorithm", &self.config.algorithm)
            .finish_non_exhaustive()
    }
}

/// Token part of a bearer header value; the scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}
