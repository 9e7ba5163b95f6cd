//! Shopql Auth: signed bearer tokens for a legacy shop.
//!
//! Users log in against the shop's existing user store and receive a signed
//! token. Every later request presents that token, and the validator checks it
//! against the shop as it is *now*: current signing key, shop url, shop id and
//! the user's current groups.
//!
//! # Modules
//!
//! - [`codec`]: Issue and parse tokens ([`TokenCodec`])
//! - [`validator`]: Per-request checks ([`TokenValidator`], [`ValidationOutcome`])
//! - [`service`]: Login and request-scoped queries ([`Authentication`])
//! - [`hooks`]: Amend claims before signing ([`BeforeTokenCreation`], [`TokenHooks`])
//! - [`legacy`] / [`keys`]: Shop collaborators ([`LegacyService`], [`KeyRegistry`])
//! - [`config`]: [`AuthConfig`]
//! - [`error`]: [`AuthError`], [`InvalidReason`] and the `Result` alias

pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod legacy;
pub mod service;
pub mod token;
pub mod validator;

mod proptests;

// Re-export key types at crate root for convenience
pub use claims::{Audience, Claims};
pub use codec::TokenCodec;
pub use config::AuthConfig;
pub use error::{AuthError, InvalidReason, Result};
pub use hooks::{BeforeTokenCreation, TokenHooks};
pub use keys::{KeyRegistry, SigningKey, StaticKeyRegistry};
pub use legacy::{LegacyService, StaticLegacyService, StaticUser, UserIdentity};
pub use service::{Authentication, Clock};
pub use token::{Token, TokenBuilder};
pub use validator::{TokenValidator, ValidationOutcome};

pub use jsonwebtoken::Algorithm;
