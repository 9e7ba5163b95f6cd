//! Signed tokens and the builder used before signing.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::Header;
use serde_json::{Map, Value};

use crate::claims::{Audience, Claims, REGISTERED_CLAIMS};
use crate::error::{AuthError, Result};

/// A decoded or freshly issued token.
///
/// Holds the compact serialization it was built from; claims never change
/// after construction.
#[derive(Debug, Clone)]
pub struct Token {
    raw: String,
    header: Header,
    claims: Claims,
}

impl Token {
    pub(crate) fn new(raw: String, header: Header, claims: Claims) -> Self {
        Self { raw, header, claims }
    }

    /// Compact serialization, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// JOSE header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The `userid` claim.
    pub fn user_id(&self) -> &str {
        &self.claims.userid
    }

    /// The `username` claim.
    pub fn user_name(&self) -> &str {
        &self.claims.username
    }

    /// The `shopid` claim, if it is an integer.
    pub fn shop_id(&self) -> Option<i64> {
        self.claims.shop_id()
    }

    /// `iat` as a timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.claims.issued_at()
    }

    /// `nbf` as a timestamp.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.claims.not_before()
    }

    /// `exp` as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Claims under construction.
///
/// The codec fills in issuer, audience, times and the shop claims, then hands
/// the builder to each registered hook before signing.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    claims: Claims,
}

impl TokenBuilder {
    pub(crate) fn new() -> Self {
        Self {
            claims: Claims {
                iss: String::new(),
                aud: Audience::Many(Vec::new()),
                iat: 0,
                nbf: 0,
                exp: 0,
                shopid: None,
                username: String::new(),
                userid: String::new(),
                extra: Map::new(),
            },
        }
    }

    /// Set `iss`.
    pub fn issued_by(&mut self, issuer: impl Into<String>) -> &mut Self {
        self.claims.iss = issuer.into();
        self
    }

    /// Add an audience to `aud`.
    pub fn permitted_for(&mut self, audience: impl Into<String>) -> &mut Self {
        let audience = audience.into();
        let current = std::mem::replace(&mut self.claims.aud, Audience::Many(Vec::new()));
        self.claims.aud = match current {
            Audience::Many(values) if values.is_empty() => Audience::One(audience),
            Audience::Many(mut values) => {
                values.push(audience);
                Audience::Many(values)
            }
            Audience::One(first) => Audience::Many(vec![first, audience]),
        };
        self
    }

    /// Set `iat`.
    pub fn issued_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claims.iat = at.timestamp();
        self
    }

    /// Set `nbf`.
    pub fn can_only_be_used_after(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claims.nbf = at.timestamp();
        self
    }

    /// Set `exp`.
    pub fn expires_at(&mut self, at: DateTime<Utc>) -> &mut Self {
        self.claims.exp = at.timestamp();
        self
    }

    /// Set a custom claim.
    ///
    /// Registered JWT claims and the shop claims are rejected with
    /// [`AuthError::ReservedClaim`].
    pub fn with_claim(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(AuthError::ReservedClaim(name));
        }
        self.claims.extra.insert(name, value.into());
        Ok(self)
    }

    /// Claims as they stand.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub(crate) fn shop_claims(&mut self, shop_id: i64, username: &str, user_id: &str) -> &mut Self {
        self.claims.shopid = Some(Value::from(shop_id));
        self.claims.username = username.to_string();
        self.claims.userid = user_id.to_string();
        self
    }

    pub(crate) fn into_claims(self) -> Claims {
        self.claims
    }
}

fn is_reserved(name: &str) -> bool {
    use crate::claims::{CLAIM_SHOPID, CLAIM_USERID, CLAIM_USERNAME};

    REGISTERED_CLAIMS.contains(&name)
        || [CLAIM_SHOPID, CLAIM_USERNAME, CLAIM_USERID].contains(&name)
}
