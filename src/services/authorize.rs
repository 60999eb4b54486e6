//! Uniform ownership/role capability check.
//!
//! Applied once per resource access instead of duplicating owner-or-admin
//! logic in every handler.

use crate::domain::models::Principal;

/// Whether `principal` may act on a resource owned by `resource_owner`.
/// Admins may act on any resource.
pub fn authorize(principal: &Principal, resource_owner: &str) -> bool {
    principal.is_admin() || principal.id == resource_owner
}
