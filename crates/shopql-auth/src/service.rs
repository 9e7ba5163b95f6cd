//! Login and per-request authentication checks.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::codec::TokenCodec;
use crate::config::AuthConfig;
use crate::error::{AuthError, InvalidReason, Result};
use crate::hooks::TokenHooks;
use crate::keys::KeyRegistry;
use crate::legacy::LegacyService;
use crate::token::Token;
use crate::validator::{TokenValidator, ValidationOutcome};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Authentication for one request.
///
/// Shares the shop collaborators with every other request and holds the
/// token the request presented, if any. Nothing is cached: each check asks
/// the validator again.
///
/// ```rust
/// use std::sync::Arc;
/// use shopql_auth::{
///     AuthConfig, Authentication, StaticKeyRegistry, StaticLegacyService, StaticUser,
/// };
///
/// # fn main() -> shopql_auth::Result<()> {
/// let legacy = Arc::new(
///     StaticLegacyService::new(1, "http://localhost/")
///         .with_user(StaticUser::new("admin", "admin", "oxdefaultadmin")),
/// );
/// let keys = Arc::new(StaticKeyRegistry::from_secret(
///     "5wi3e0INwNhKe3kqvlH0m4FHYMo6hKef3SzweEfaqmKK5Iv4qD0UrvA8p0bUNzd7",
/// )?);
/// let auth = Authentication::new(legacy, keys, AuthConfig::default());
///
/// let token = auth.login("admin", "admin")?;
/// let request = auth.with_token(Some(token));
/// assert!(request.is_logged()?);
/// assert_eq!(request.user_name()?, "admin");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Authentication {
    legacy: Arc<dyn LegacyService>,
    codec: TokenCodec,
    validator: TokenValidator,
    hooks: TokenHooks,
    token: Option<Token>,
    clock: Clock,
}

impl Authentication {
    /// Service without a request token and without hooks.
    pub fn new(
        legacy: Arc<dyn LegacyService>,
        keys: Arc<dyn KeyRegistry>,
        config: AuthConfig,
    ) -> Self {
        Self {
            codec: TokenCodec::new(keys.clone(), &config),
            validator: TokenValidator::new(legacy.clone(), keys, config),
            legacy,
            hooks: TokenHooks::new(),
            token: None,
            clock: Arc::new(Utc::now),
        }
    }

    /// Use these hooks when issuing tokens.
    pub fn with_hooks(mut self, hooks: TokenHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use this clock for issuance and validation.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The same service bound to another request token.
    pub fn with_token(&self, token: Option<Token>) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    /// The request token, if one was presented.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Codec used for issuance.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Validator used for request checks.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Check credentials against the legacy store and issue a token.
    pub fn login(&self, username: &str, password: &str) -> Result<Token> {
        let identity = self.legacy.login(username, password).inspect_err(|e| {
            log::warn!("Login failed for '{username}': {e}");
        })?;

        self.codec.issue(
            username,
            &identity,
            &self.legacy.shop_url(),
            self.legacy.shop_id(),
            (self.clock)(),
            &self.hooks,
        )
    }

    /// Validation outcome of the request token, evaluated now.
    pub fn outcome(&self) -> Result<ValidationOutcome> {
        self.validator.evaluate(self.token.as_ref(), (self.clock)())
    }

    /// Whether the request belongs to a logged-in user.
    ///
    /// No token and anonymous users give `false`; a rejected token is an error.
    pub fn is_logged(&self) -> Result<bool> {
        match self.outcome()? {
            ValidationOutcome::Valid => Ok(true),
            ValidationOutcome::Anonymous | ValidationOutcome::NoToken => Ok(false),
            ValidationOutcome::Invalid(reason) => Err(AuthError::InvalidToken(reason)),
        }
    }

    /// The `userid` claim of the request token.
    ///
    /// Reads the claim without validating the token.
    pub fn user_id(&self) -> Result<String> {
        Ok(self.require_token()?.user_id().to_string())
    }

    /// The `username` claim, for logged-in users only.
    pub fn user_name(&self) -> Result<String> {
        if !self.is_logged()? {
            return Err(AuthError::InvalidToken(InvalidReason::NotLoggedIn));
        }
        Ok(self.require_token()?.user_name().to_string())
    }

    /// Whether the token's user currently belongs to the anonymous group.
    pub fn is_user_anonymous(&self) -> Result<bool> {
        let token = self.require_token()?;
        let groups = self.legacy.user_group_ids(token.user_id())?;
        Ok(groups.contains(&self.validator.config().anonymous_group))
    }

    fn require_token(&self) -> Result<&Token> {
        self.token
            .as_ref()
            .ok_or(AuthError::InvalidToken(InvalidReason::MissingToken))
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authentication")
            .field("validator", &self.validator)
            .field("hooks", &self.hooks)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}
