//! Signing key material.
//!
//! The shop decides which key signs its tokens; [`KeyRegistry`] is the seam
//! through which the codec and validator ask for it on every call.

use std::fmt;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::{AuthError, Result};

/// Shortest HMAC secret accepted, in bytes.
pub const MIN_SIGNATURE_KEY_LENGTH: usize = 64;

/// An algorithm together with its signing and verification keys.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// Shared-secret key for `HS256`, `HS384` or `HS512`.
    pub fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Config(format!(
                "{algorithm:?} is not an HMAC algorithm"
            )));
        }
        if secret.len() < MIN_SIGNATURE_KEY_LENGTH {
            return Err(AuthError::MissingSignatureKey);
        }

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// RSA key pair: a PEM private key and the base64url public components.
    pub fn rsa(
        algorithm: Algorithm,
        private_pem: &[u8],
        modulus: &str,
        exponent: &str,
    ) -> Result<Self> {
        if !matches!(
            algorithm,
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512
        ) {
            return Err(AuthError::Config(format!(
                "{algorithm:?} is not an RSA algorithm"
            )));
        }
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| AuthError::Config(format!("invalid RSA private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_components(modulus, exponent)
            .map_err(|e| AuthError::Config(format!("invalid RSA public key: {e}")))?;

        Ok(Self {
            algorithm,
            encoding,
            decoding,
        })
    }

    /// The signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Key used to sign.
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Key used to verify.
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Supplies the current signing key for the shop.
pub trait KeyRegistry: Send + Sync {
    /// The key to sign new tokens with and to verify presented ones against.
    fn signing_key(&self) -> Result<SigningKey>;
}

/// Registry holding one fixed key.
#[derive(Clone, Debug)]
pub struct StaticKeyRegistry {
    key: SigningKey,
}

impl StaticKeyRegistry {
    /// Wrap an existing key.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// `HS512` registry from a shop signature secret.
    pub fn from_secret(secret: &str) -> Result<Self> {
        Self::from_secret_with(Algorithm::HS512, secret)
    }

    /// HMAC registry from a shop signature secret and algorithm.
    pub fn from_secret_with(algorithm: Algorithm, secret: &str) -> Result<Self> {
        Ok(Self::new(SigningKey::hmac(algorithm, secret.as_bytes())?))
    }
}

impl KeyRegistry for StaticKeyRegistry {
    fn signing_key(&self) -> Result<SigningKey> {
        Ok(self.key.clone())
    }
}
