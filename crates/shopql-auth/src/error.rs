//! Auth-specific error types.

use std::fmt;

/// Why a parsable token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// Signature does not verify against the current shop key.
    BadSignature,
    /// The `exp` claim lies in the past.
    Expired,
    /// The `nbf` or `iat` claim lies in the future.
    NotYetValid,
    /// The `iss` claim is not the current shop url.
    IssuerMismatch,
    /// The `aud` claim does not contain the current shop url.
    AudienceMismatch,
    /// The token carries no `shopid` claim.
    MissingShopId,
    /// The `shopid` claim differs from the current shop id.
    ShopIdMismatch,
    /// The user currently belongs to the blocked group.
    UserBlocked,
    /// A token was required but none was presented.
    MissingToken,
    /// The user is anonymous or otherwise not logged in.
    NotLoggedIn,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BadSignature => "signature does not match the shop key",
            Self::Expired => "token has expired",
            Self::NotYetValid => "token is not valid yet",
            Self::IssuerMismatch => "issuer does not match the shop url",
            Self::AudienceMismatch => "audience does not include the shop url",
            Self::MissingShopId => "token carries no shop id",
            Self::ShopIdMismatch => "token was issued for another shop",
            Self::UserBlocked => "user is blocked",
            Self::MissingToken => "no token provided",
            Self::NotLoggedIn => "user is not logged in",
        };
        f.write_str(message)
    }
}

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The legacy user store rejected the credentials.
    #[error("username/password combination is invalid")]
    InvalidLogin,

    /// The token parsed but is not acceptable right now.
    #[error("invalid token: {0}")]
    InvalidToken(InvalidReason),

    /// The token string is not a compact JWS with a readable payload.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// No signature key configured, or the key is shorter than 64 bytes.
    #[error("signature key is missing or too short")]
    MissingSignatureKey,

    /// A token hook tried to set a registered claim through `with_claim`.
    #[error("claim '{0}' is reserved")]
    ReservedClaim(String),

    /// The signing backend failed.
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// The legacy user service failed.
    #[error("legacy service error: {0}")]
    Legacy(String),

    /// Configuration could not be read or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for shopql-auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Whether the caller is at fault (vs. the shop backend).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidLogin | AuthError::InvalidToken(_) | AuthError::MalformedToken(_)
        )
    }

    /// HTTP status a resolver layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::InvalidLogin => 401,
            AuthError::InvalidToken(_) => 403,
            AuthError::MalformedToken(_) => 400,
            _ => 500,
        }
    }

    /// The rejection reason, when this is an [`AuthError::InvalidToken`].
    pub fn reason(&self) -> Option<InvalidReason> {
        match self {
            AuthError::InvalidToken(reason) => Some(*reason),
            _ => None,
        }
    }
}
