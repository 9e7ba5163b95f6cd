//! Extension point fired before a token is signed.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::legacy::UserIdentity;
use crate::token::TokenBuilder;

/// Observer that may amend a token before it is signed.
///
/// Runs synchronously during login. An error aborts issuance.
pub trait BeforeTokenCreation: Send + Sync {
    /// Inspect or amend `builder` for the user that just logged in.
    fn before_token_creation(
        &self,
        builder: &mut TokenBuilder,
        identity: &UserIdentity,
    ) -> Result<()>;
}

impl<F> BeforeTokenCreation for F
where
    F: Fn(&mut TokenBuilder, &UserIdentity) -> Result<()> + Send + Sync,
{
    fn before_token_creation(
        &self,
        builder: &mut TokenBuilder,
        identity: &UserIdentity,
    ) -> Result<()> {
        self(builder, identity)
    }
}

/// Hooks in registration order.
#[derive(Clone, Default)]
pub struct TokenHooks {
    hooks: Vec<Arc<dyn BeforeTokenCreation>>,
}

impl TokenHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook.
    pub fn register(&mut self, hook: impl BeforeTokenCreation + 'static) -> &mut Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Builder form of [`TokenHooks::register`].
    pub fn with(mut self, hook: impl BeforeTokenCreation + 'static) -> Self {
        self.register(hook);
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn dispatch(
        &self,
        builder: &mut TokenBuilder,
        identity: &UserIdentity,
    ) -> Result<()> {
        for hook in &self.hooks {
            hook.before_token_creation(builder, identity)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TokenHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}
