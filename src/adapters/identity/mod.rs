//! Config-backed identity resolution.
//!
//! Stands in for the external credential subsystem: bearer tokens are
//! mapped to principals from configuration. Token issuance, password
//! handling, and account management are out of scope.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::models::{ApiKeyConfig, Principal, Role};
use crate::domain::ports::IdentityProvider;

/// Identity provider backed by a static token table.
pub struct StaticIdentityProvider {
    principals: HashMap<String, Principal>,
}

impl StaticIdentityProvider {
    pub fn new(keys: &[ApiKeyConfig]) -> Self {
        let principals = keys
            .iter()
            .map(|key| {
                let roles: Vec<Role> = key
                    .roles
                    .iter()
                    .filter_map(|r| Role::from_str(r))
                    .collect();
                (
                    key.token.clone(),
                    Principal {
                        id: key.id.clone(),
                        username: key.username.clone(),
                        roles: if roles.is_empty() { vec![Role::User] } else { roles },
                        quota: key.quota.clone(),
                    },
                )
            })
            .collect();
        Self { principals }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> Option<Principal> {
        self.principals.get(token).cloned()
    }
}
