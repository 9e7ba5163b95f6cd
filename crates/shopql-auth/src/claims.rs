//! Token claims.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Claim carrying the shop id the token was issued for.
pub const CLAIM_SHOPID: &str = "shopid";

/// Claim carrying the login name.
pub const CLAIM_USERNAME: &str = "username";

/// Claim carrying the legacy user id.
pub const CLAIM_USERID: &str = "userid";

/// Registered JWT claim names. Only the codec sets these.
pub const REGISTERED_CLAIMS: &[&str] = &["iss", "sub", "aud", "exp", "nbf", "iat", "jti"];

/// The `aud` claim: a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// One audience.
    One(String),
    /// Several audiences.
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is among the listed values.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Claims carried by a shop token.
///
/// Timestamps are seconds since the epoch; fractional NumericDates are
/// floored on the way in. `shopid` is kept as sent so that a non-integer id
/// reaches validation and fails there. Claims a hook adds beyond the known
/// set are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (the shop url).
    pub iss: String,
    /// Audience (the shop url).
    pub aud: Audience,
    /// Issued at.
    #[serde(deserialize_with = "numeric_date")]
    pub iat: i64,
    /// Not before.
    #[serde(deserialize_with = "numeric_date")]
    pub nbf: i64,
    /// Expires at.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    /// Shop the token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopid: Option<Value>,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Legacy user id.
    #[serde(default)]
    pub userid: String,
    /// Custom claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// `iat` as a timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// `nbf` as a timestamp.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.nbf, 0)
    }

    /// `exp` as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// The `shopid` claim, if it is an integer.
    pub fn shop_id(&self) -> Option<i64> {
        self.shopid.as_ref().and_then(Value::as_i64)
    }

    /// Look up a custom claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

fn numeric_date<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|secs| secs.floor() as i64))
        .ok_or_else(|| de::Error::custom(format!("{number} is not a NumericDate")))
}
