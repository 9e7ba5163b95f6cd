//! Handler functions for the CLI subcommands.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use shopql_auth::{Authentication, StaticKeyRegistry, StaticLegacyService, TokenCodec};

use crate::config::CliConfig;

/// Result of `shopql check`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Whether the token belongs to a logged-in user.
    pub logged: bool,
    /// Whether the user is in the anonymous group.
    pub anonymous: bool,
    /// The `userid` claim.
    pub user_id: String,
    /// The `username` claim, for logged-in users.
    pub user_name: Option<String>,
}

/// Build the service described by `config`.
pub fn build_service(config: &CliConfig) -> Result<Authentication> {
    let legacy = StaticLegacyService::new(config.shop.id, config.shop.url.clone());
    for user in &config.users {
        legacy.add_user(user.clone());
    }
    let keys =
        StaticKeyRegistry::from_secret_with(config.auth.algorithm, &config.shop.signature_key)
            .context("Unusable shop signature key")?;

    Ok(Authentication::new(
        Arc::new(legacy),
        Arc::new(keys),
        config.auth.clone(),
    ))
}

/// Log in and return the compact token.
pub fn login(auth: &Authentication, username: &str, password: &str) -> Result<String> {
    let token = auth.login(username, password)?;
    tracing::info!(user_id = %token.user_id(), "Issued token");
    Ok(token.to_string())
}

/// Header and claims of `raw`, without verification.
pub fn inspect(raw: &str) -> Result<Value> {
    let token = TokenCodec::decode(Some(raw))?.context("No token given")?;
    Ok(json!({
        "header": token.header(),
        "claims": token.claims(),
    }))
}

/// Validate `raw` against the configured shop.
pub fn check(auth: &Authentication, raw: &str) -> Result<CheckReport> {
    let token = TokenCodec::decode(Some(raw))?.context("No token given")?;
    let request = auth.with_token(Some(token));

    let logged = request.is_logged()?;
    Ok(CheckReport {
        logged,
        anonymous: request.is_user_anonymous()?,
        user_id: request.user_id()?,
        user_name: if logged {
            Some(request.user_name()?)
        } else {
            None
        },
    })
}
