//! Common test utilities and harness for shopql-auth integration tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shopql_auth::{
    AuthConfig, Authentication, StaticKeyRegistry, StaticLegacyService, StaticUser, Token,
    TokenCodec,
};

/// Shop signature secret used by every harness.
pub const SECRET: &str = "5wi3e0INwNhKe3kqvlH0m4FHYMo6hKef3SzweEfaqmKK5Iv4qD0UrvA8p0bUNzd7";

/// Shop url the harness starts with.
pub const SHOP_URL: &str = "http://localhost/";

/// Regular customer.
pub const CUSTOMER: (&str, &str, &str) = (
    "user@example.com",
    "useruser",
    "e7af1c3b786fd02906ccd75698f4e6b9",
);

/// Shop administrator.
pub const ADMIN: (&str, &str, &str) = ("admin", "admin", "oxdefaultadmin");

/// Fixed instant all harness clocks start at.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_768_464_000, 0).expect("valid timestamp")
}

/// Test harness for integration tests.
///
/// Holds the legacy store so tests can change shop state between calls.
pub struct TestHarness {
    /// In-memory legacy store shared with the service
    pub legacy: Arc<StaticLegacyService>,
    /// Service bound to no token, with a fixed clock
    pub auth: Authentication,
}

impl TestHarness {
    /// Shop 1 at [`SHOP_URL`] with [`CUSTOMER`] and [`ADMIN`].
    pub fn new() -> Self {
        Self::with_config(AuthConfig::default())
    }

    /// Same shop with a custom auth configuration.
    pub fn with_config(config: AuthConfig) -> Self {
        let legacy = Arc::new(
            StaticLegacyService::new(1, SHOP_URL)
                .with_user(StaticUser::new(CUSTOMER.0, CUSTOMER.1, CUSTOMER.2))
                .with_user(StaticUser::new(ADMIN.0, ADMIN.1, ADMIN.2).with_group("oxidadmin")),
        );
        let keys = Arc::new(StaticKeyRegistry::from_secret(SECRET).expect("valid secret"));
        let auth = Authentication::new(legacy.clone(), keys, config).with_clock(fixed_now);
        Self { legacy, auth }
    }

    /// Log in as `user` and return the issued token.
    pub fn login(&self, user: (&str, &str, &str)) -> Token {
        self.auth.login(user.0, user.1).expect("login should succeed")
    }

    /// Service for a request carrying `Authorization: <header>`.
    pub fn request(&self, authorization: Option<&str>) -> Authentication {
        let token = TokenCodec::decode_bearer(authorization).expect("well-formed header");
        self.auth.with_token(token)
    }

    /// Service for a request presenting `token` as a bearer token.
    pub fn bearer(&self, token: &Token) -> Authentication {
        self.request(Some(&format!("Bearer {token}")))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
