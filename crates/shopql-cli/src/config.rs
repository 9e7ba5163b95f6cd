//! Configuration file for the `shopql` command.
//!
//! ```toml
//! [auth]
//! token_lifetime_secs = 28800
//!
//! [shop]
//! id = 1
//! url = "http://localhost/"
//! signature_key = "..."
//!
//! [[users]]
//! username = "admin"
//! password = "admin"
//! user_id = "oxdefaultadmin"
//! groups = ["oxidadmin"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shopql_auth::{AuthConfig, StaticUser};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "shopql.toml";

/// Shop identity and signing secret.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Shop id written into and checked against the `shopid` claim.
    pub id: i64,
    /// Shop url, used as issuer and audience.
    pub url: String,
    /// HMAC secret, at least 64 bytes.
    pub signature_key: String,
}

/// Everything the CLI needs to stand up an authentication service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// The shop.
    pub shop: ShopConfig,
    /// Users of the in-memory legacy store.
    #[serde(default)]
    pub users: Vec<StaticUser>,
}

impl CliConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("Failed to parse configuration")?;
        config.auth.validate()?;
        Ok(config)
    }

    /// Read a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&source).with_context(|| format!("Invalid config {}", path.display()))
    }
}
