//! Wildcard permission matching for validated keys.
//!
//! An empty permission list grants unrestricted access — issuers must
//! populate the list to restrict a key.  Beyond exact matches, the
//! universal wildcard `*` and prefix wildcards of the form `resource:*`
//! (matching any `resource:...` action) are honored.

use super::record::ValidatedKey;

/// Check an action against a permission list.
pub fn has_permission(permissions: &[String], action: &str) -> bool {
    if permissions.is_empty() {
        return true;
    }
    permissions.iter().any(|p| permission_matches(p, action))
}

/// Match a single permission string against an action.
fn permission_matches(permission: &str, action: &str) -> bool {
    if permission == "*" || permission == action {
        return true;
    }

    // "ramp:*" matches "ramp:read" and "ramp:quote:create", but not
    // "ramp" itself or "rampx:read".
    if let Some(resource) = permission.strip_suffix(":*") {
        return action
            .strip_prefix(resource)
            .is_some_and(|rest| rest.starts_with(':'));
    }

    false
}

impl ValidatedKey {
    /// Whether this key may perform `action`.
    pub fn has_permission(&self, action: &str) -> bool {
        has_permission(&self.permissions, action)
    }

    /// Whether this key may perform every one of `actions`.
    pub fn has_all_permissions(&self, actions: &[&str]) -> bool {
        actions.iter().all(|action| self.has_permission(action))
    }

    /// Whether this key may perform at least one of `actions`.
    pub fn has_any_permission(&self, actions: &[&str]) -> bool {
        actions.iter().any(|action| self.has_permission(action))
    }
}
