//! Resolved credential caching.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::Authentication;

/// Cache for the resolved authentication, shared by client clones.
///
/// Resolution is not serialized: two concurrent first calls may both log in,
/// and the last one to finish wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenCache {
    inner: Arc<RwLock<Option<Authentication>>>,
}

impl TokenCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached authentication, if any.
    pub async fn get(&self) -> Option<Authentication> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Stores the resolved authentication.
    pub async fn set(&self, authentication: Authentication) {
        let mut guard = self.inner.write().await;
        *guard = Some(authentication);
    }

    /// Clears the cached authentication.
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_cache_authentication() {
        let cache = TokenCache::new();
        assert!(cache.get().await.is_none());

        cache.set(Authentication::Bearer("cached-token".into())).await;

        let cached = cache.get().await.expect("authentication should be cached");
        assert!(
            matches!(cached, Authentication::Bearer(token) if token.equals_str("cached-token"))
        );
    }

    #[tokio::test]
    async fn should_share_cache_between_clones() {
        let cache = TokenCache::new();
        let clone = cache.clone();

        clone.set(Authentication::Bearer("shared".into())).await;

        assert!(cache.get().await.is_some());
    }

    #[tokio::test]
    async fn should_clear_cache() {
        let cache = TokenCache::new();
        cache.set(Authentication::Bearer("token".into())).await;
        assert!(cache.get().await.is_some());

        cache.clear().await;
        assert!(cache.get().await.is_none());
    }
}
