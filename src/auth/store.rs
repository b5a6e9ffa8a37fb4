//! In-memory principal store.
//!
//! A demo and test adapter for the [`PrincipalStore`] seam. Real
//! deployments supply their own store; this one exists so the binary and
//! the test suite have something to look tokens up in.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::auth::principal::{Principal, PrincipalStore};

/// Concurrent token → principal map, keyed by (token field, token value).
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<(String, String), Principal>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal reachable under the given token field/value.
    pub fn insert(&self, token_field: &str, token: &str, principal: Principal) {
        self.users
            .insert((token_field.to_string(), token.to_string()), principal);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn lookup(&self, token_field: &str, token: &str) -> Option<Principal> {
        self.users
            .get(&(token_field.to_string(), token.to_string()))
            .map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn principal(id: &str) -> Principal {
        Principal {
            id: id.into(),
            roles: Default::default(),
            scopes: Default::default(),
            record: json!({}),
        }
    }

    #[tokio::test]
    async fn test_lookup_respects_token_field() {
        let store = MemoryStore::new();
        store.insert("token", "abc", principal("u-1"));

        assert!(store.lookup("token", "abc").await.is_some());
        assert!(store.lookup("api_key", "abc").await.is_none());
        assert!(store.lookup("token", "other").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_overwrites() {
        let store = MemoryStore::new();
        store.insert("token", "abc", principal("u-1"));
        store.insert("token", "abc", principal("u-2"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup("token", "abc").await.unwrap().id, "u-2");
    }
}
