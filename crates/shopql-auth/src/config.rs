//! Token lifetime, clock leeway and group markers.

use std::path::Path;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Default token lifetime: 8 hours.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u32 = 8 * 60 * 60;

/// Default legacy group id marking blocked users.
pub const DEFAULT_BLOCKED_GROUP: &str = "oxidblocked";

/// Default legacy group id marking anonymous users.
pub const DEFAULT_ANONYMOUS_GROUP: &str = "oxidanonymous";

/// Configuration for token issuance and validation.
///
/// Every field has a default, so an empty `[auth]` table is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Seconds between issuance and expiry.
    pub token_lifetime_secs: u32,
    /// Clock skew tolerated on `iat`, `nbf` and `exp`.
    pub leeway_secs: u32,
    /// Group id that makes a user's tokens invalid.
    pub blocked_group: String,
    /// Group id that makes a user anonymous.
    pub anonymous_group: String,
    /// Signing algorithm the key registry must use. Issuance and validation
    /// fail with a configuration error otherwise.
    pub algorithm: Algorithm,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            leeway_secs: 0,
            blocked_group: DEFAULT_BLOCKED_GROUP.to_string(),
            anonymous_group: DEFAULT_ANONYMOUS_GROUP.to_string(),
            algorithm: Algorithm::HS512,
        }
    }
}

impl AuthConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| AuthError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Reject settings that would make every token unusable or ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.token_lifetime_secs == 0 {
            return Err(AuthError::Config(
                "token_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.blocked_group.is_empty() || self.anonymous_group.is_empty() {
            return Err(AuthError::Config(
                "group markers must not be empty".to_string(),
            ));
        }
        if self.blocked_group == self.anonymous_group {
            return Err(AuthError::Config(format!(
                "blocked and anonymous group are both '{}'",
                self.blocked_group
            )));
        }
        Ok(())
    }

    /// Lifetime as a duration.
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.token_lifetime_secs))
    }

    /// Fail unless the key registry signs with the configured algorithm.
    pub fn check_algorithm(&self, algorithm: Algorithm) -> Result<()> {
        if algorithm != self.algorithm {
            return Err(AuthError::Config(format!(
                "signing key uses {algorithm:?}, expected {:?}",
                self.algorithm
            )));
        }
        Ok(())
    }

    /// Leeway as whole seconds.
    pub fn leeway(&self) -> i64 {
        i64::from(self.leeway_secs)
    }
}
