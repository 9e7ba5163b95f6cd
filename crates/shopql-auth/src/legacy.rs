//! Bridge to the legacy shop user store.
//!
//! [`LegacyService`] is everything the token core needs from the shop:
//! credential checks, live group membership and the current shop identity.
//! [`StaticLegacyService`] is an in-memory implementation used by the CLI
//! and by tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Identity returned by a successful legacy login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Legacy user id.
    pub user_id: String,
    /// Shop the user logged into.
    pub shop_id: i64,
    /// Url of that shop.
    pub shop_url: String,
    /// Group ids at login time.
    pub groups: BTreeSet<String>,
}

/// Operations the token core consumes from the legacy shop.
///
/// Implementations are queried on every validation; they must not cache
/// group membership or shop identity on behalf of the core.
pub trait LegacyService: Send + Sync {
    /// Check credentials and return the user's identity.
    ///
    /// Fails with [`AuthError::InvalidLogin`] when they do not match.
    fn login(&self, username: &str, password: &str) -> Result<UserIdentity>;

    /// Current group ids of a user. Unknown users have no groups.
    fn user_group_ids(&self, user_id: &str) -> Result<BTreeSet<String>>;

    /// Current shop id.
    fn shop_id(&self) -> i64;

    /// Current shop url.
    fn shop_url(&self) -> String;
}

/// A user record of [`StaticLegacyService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticUser {
    /// Login name.
    pub username: String,
    /// Plain password.
    pub password: String,
    /// Legacy user id.
    pub user_id: String,
    /// Group ids.
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl StaticUser {
    /// A user without groups.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            user_id: user_id.into(),
            groups: BTreeSet::new(),
        }
    }

    /// Add a group id.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }
}

#[derive(Debug)]
struct ShopState {
    id: i64,
    url: String,
}

/// In-memory legacy store.
///
/// Shop identity and group membership can be changed after tokens were
/// issued, which is how revocation reaches existing tokens.
#[derive(Debug)]
pub struct StaticLegacyService {
    shop: RwLock<ShopState>,
    // keyed by username
    users: RwLock<BTreeMap<String, StaticUser>>,
}

impl StaticLegacyService {
    /// An empty store for one shop.
    pub fn new(shop_id: i64, shop_url: impl Into<String>) -> Self {
        Self {
            shop: RwLock::new(ShopState {
                id: shop_id,
                url: shop_url.into(),
            }),
            users: RwLock::new(BTreeMap::new()),
        }
    }

    /// Builder form of [`StaticLegacyService::add_user`].
    pub fn with_user(self, user: StaticUser) -> Self {
        self.add_user(user);
        self
    }

    /// Insert or replace a user.
    pub fn add_user(&self, user: StaticUser) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.insert(user.username.clone(), user);
    }

    /// Replace the groups of the user with `user_id`. Returns whether it exists.
    pub fn set_groups<I, S>(&self, user_id: &str, groups: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.values_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.groups = groups.into_iter().map(Into::into).collect();
                true
            }
            None => false,
        }
    }

    /// Change the current shop id.
    pub fn set_shop_id(&self, shop_id: i64) {
        self.shop.write().unwrap_or_else(PoisonError::into_inner).id = shop_id;
    }

    /// Change the current shop url.
    pub fn set_shop_url(&self, shop_url: impl Into<String>) {
        self.shop.write().unwrap_or_else(PoisonError::into_inner).url = shop_url.into();
    }
}

impl LegacyService for StaticLegacyService {
    fn login(&self, username: &str, password: &str) -> Result<UserIdentity> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let user = users
            .get(username)
            .filter(|u| u.password == password)
            .ok_or(AuthError::InvalidLogin)?;

        Ok(UserIdentity {
            user_id: user.user_id.clone(),
            shop_id: self.shop_id(),
            shop_url: self.shop_url(),
            groups: user.groups.clone(),
        })
    }

    fn user_group_ids(&self, user_id: &str) -> Result<BTreeSet<String>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .values()
            .find(|u| u.user_id == user_id)
            .map(|u| u.groups.clone())
            .unwrap_or_default())
    }

    fn shop_id(&self) -> i64 {
        self.shop.read().unwrap_or_else(PoisonError::into_inner).id
    }

    fn shop_url(&self) -> String {
        self.shop
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .url
            .clone()
    }
}
