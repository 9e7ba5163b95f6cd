//! Token validation against the live shop state.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. no token presented → [`ValidationOutcome::NoToken`]
//! 2. signature, issuer and audience against the current key and shop url,
//!    then the `iat`/`nbf`/`exp` window
//! 3. the `shopid` claim against the current shop id
//! 4. the user's current groups: blocked → invalid, anonymous → anonymous
//!
//! Steps 2–4 query the key registry and legacy service on every call, so the
//! same token can be valid at one call and invalid at the next.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Validation, decode};

use crate::config::AuthConfig;
use crate::error::{AuthError, InvalidReason, Result};
use crate::keys::KeyRegistry;
use crate::legacy::LegacyService;
use crate::token::Token;

/// Result of validating a request's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Valid token of a regular user.
    Valid,
    /// Valid token of a user in the anonymous group.
    Anonymous,
    /// Token rejected.
    Invalid(InvalidReason),
    /// No token presented.
    NoToken,
}

impl ValidationOutcome {
    /// Whether the request belongs to a logged-in user.
    pub fn is_logged(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Whether the token itself was accepted (logged in or anonymous).
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Valid | Self::Anonymous)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Anonymous => write!(f, "anonymous"),
            Self::Invalid(reason) => write!(f, "invalid: {reason}"),
            Self::NoToken => write!(f, "no token"),
        }
    }
}

/// Validates tokens for the current shop.
#[derive(Clone)]
pub struct TokenValidator {
    legacy: Arc<dyn LegacyService>,
    keys: Arc<dyn KeyRegistry>,
    config: AuthConfig,
}

impl TokenValidator {
    /// Validator backed by the given shop collaborators.
    pub fn new(
        legacy: Arc<dyn LegacyService>,
        keys: Arc<dyn KeyRegistry>,
        config: AuthConfig,
    ) -> Self {
        Self {
            legacy,
            keys,
            config,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Classify `token` as of `now`.
    ///
    /// Only collaborator failures are returned as `Err`; a rejected token is
    /// `Ok(ValidationOutcome::Invalid(_))`.
    pub fn evaluate(&self, token: Option<&Token>, now: DateTime<Utc>) -> Result<ValidationOutcome> {
        let Some(token) = token else {
            return Ok(ValidationOutcome::NoToken);
        };

        if let Some(reason) = self.check_signature(token)? {
            return Ok(self.reject(token, reason));
        }
        if let Some(reason) = self.check_lifetime(token, now) {
            return Ok(self.reject(token, reason));
        }
        if let Some(reason) = self.check_shop(token) {
            return Ok(self.reject(token, reason));
        }

        let groups = self.legacy.user_group_ids(token.user_id())?;
        if groups.contains(&self.config.blocked_group) {
            return Ok(self.reject(token, InvalidReason::UserBlocked));
        }
        if groups.contains(&self.config.anonymous_group) {
            log::debug!("Token of user '{}' is anonymous", token.user_id());
            return Ok(ValidationOutcome::Anonymous);
        }

        log::debug!("Token of user '{}' is valid", token.user_id());
        Ok(ValidationOutcome::Valid)
    }

    /// Accept `token` or fail with [`AuthError::InvalidToken`].
    ///
    /// Anonymous users pass: their token is sound, they are just not logged in.
    pub fn validate_token(&self, token: &Token, now: DateTime<Utc>) -> Result<()> {
        match self.evaluate(Some(token), now)? {
            ValidationOutcome::Valid | ValidationOutcome::Anonymous => Ok(()),
            ValidationOutcome::Invalid(reason) => Err(AuthError::InvalidToken(reason)),
            ValidationOutcome::NoToken => Err(AuthError::InvalidToken(InvalidReason::MissingToken)),
        }
    }

    fn check_signature(&self, token: &Token) -> Result<Option<InvalidReason>> {
        let key = self.keys.signing_key()?;
        self.config.check_algorithm(key.algorithm())?;
        let shop_url = self.legacy.shop_url();

        let mut validation = Validation::new(key.algorithm());
        validation.set_issuer(&[&shop_url]);
        validation.set_audience(&[&shop_url]);
        validation.set_required_spec_claims(&["iss", "aud"]);
        // time window is checked against the caller's clock below
        validation.validate_exp = false;
        validation.validate_nbf = false;

        match decode::<serde_json::Value>(token.as_str(), key.decoding_key(), &validation) {
            Ok(_) => Ok(None),
            Err(e) => Ok(Some(match e.kind() {
                ErrorKind::InvalidIssuer => InvalidReason::IssuerMismatch,
                ErrorKind::InvalidAudience => InvalidReason::AudienceMismatch,
                _ => InvalidReason::BadSignature,
            })),
        }
    }

    fn check_lifetime(&self, token: &Token, now: DateTime<Utc>) -> Option<InvalidReason> {
        let claims = token.claims();
        let now = now.timestamp();
        let leeway = self.config.leeway();

        if now + leeway < claims.nbf || now + leeway < claims.iat {
            return Some(InvalidReason::NotYetValid);
        }
        if now - leeway >= claims.exp {
            return Some(InvalidReason::Expired);
        }
        None
    }

    fn check_shop(&self, token: &Token) -> Option<InvalidReason> {
        // a string or fractional id never equals the shop's integer id
        match &token.claims().shopid {
            None => Some(InvalidReason::MissingShopId),
            Some(id) if id.as_i64() == Some(self.legacy.shop_id()) => None,
            Some(_) => Some(InvalidReason::ShopIdMismatch),
        }
    }

    fn reject(&self, token: &Token, reason: InvalidReason) -> ValidationOutcome {
        log::warn!("Rejected token of user '{}': {reason}", token.user_id());
        ValidationOutcome::Invalid(reason)
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
