use crate::domain::models::Principal;
use async_trait::async_trait;

/// Port over the authentication collaborator.
///
/// Credential issuance and verification are out of scope; this capability
/// resolves a presented bearer token to an authenticated principal.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token. `None` means the token is unknown or
    /// the account is disabled.
    async fn authenticate(&self, token: &str) -> Option<Principal>;
}
