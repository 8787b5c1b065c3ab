//! Permission catalog entities

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stable identifier of a named permission.
///
/// The nil UUID is reserved as the "unresolved" sentinel: it never appears in
/// storage, so a rule referencing an unseeded permission can never match a
/// grant row (fail-closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Sentinel returned for catalog misses.
    pub const UNRESOLVED: PermissionId = PermissionId(Uuid::nil());

    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn is_unresolved(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Permission entity as stored in the `permissions` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: PermissionId,
    pub code: String,
    pub description: Option<String>,
}

/// The fixed, enumerable catalog of permission names.
///
/// Checks may reference any of these before seeding; an unseeded name simply
/// resolves to [`PermissionId::UNRESOLVED`] and evaluates to false.
pub mod names {
    // Case permissions
    pub const VIEW_OWN_CASE: &str = "VIEW_OWN_CASE";
    pub const VIEW_CASE: &str = "VIEW_CASE";
    pub const VIEW_ANY_CASE: &str = "VIEW_ANY_CASE";
    pub const VIEW_PUBLIC_CASE: &str = "VIEW_PUBLIC_CASE";
    pub const EDIT_OWN_CASE: &str = "EDIT_OWN_CASE";
    pub const EDIT_CASE: &str = "EDIT_CASE";
    pub const EDIT_ANY_CASE: &str = "EDIT_ANY_CASE";
    pub const ASSIGN_OWN_CASE: &str = "ASSIGN_OWN_CASE";
    pub const ASSIGN_CASE: &str = "ASSIGN_CASE";
    pub const ASSIGN_ANY_CASE: &str = "ASSIGN_ANY_CASE";
    pub const REGISTER_CASE: &str = "REGISTER_CASE";

    // User-relationship permissions
    pub const VIEW_OWN_USER: &str = "VIEW_OWN_USER";
    pub const VIEW_USER: &str = "VIEW_USER";
    pub const VIEW_ANY_USER: &str = "VIEW_ANY_USER";
    pub const VIEW_PUBLIC_USER: &str = "VIEW_PUBLIC_USER";
    pub const EDIT_OWN_USER: &str = "EDIT_OWN_USER";
    pub const EDIT_USER: &str = "EDIT_USER";
    pub const EDIT_ANY_USER: &str = "EDIT_ANY_USER";
    pub const REGISTER_USER: &str = "REGISTER_USER";

    // Grant administration permissions, one set per account kind
    pub const VIEW_USER_PERMISSIONS: &str = "VIEW_USER_PERMISSIONS";
    pub const GRANT_USER_PERMISSIONS: &str = "GRANT_USER_PERMISSIONS";
    pub const REVOKE_USER_PERMISSIONS: &str = "REVOKE_USER_PERMISSIONS";
    pub const VIEW_LAWYER_PERMISSIONS: &str = "VIEW_LAWYER_PERMISSIONS";
    pub const GRANT_LAWYER_PERMISSIONS: &str = "GRANT_LAWYER_PERMISSIONS";
    pub const REVOKE_LAWYER_PERMISSIONS: &str = "REVOKE_LAWYER_PERMISSIONS";
    pub const VIEW_CUSTOMER_PERMISSIONS: &str = "VIEW_CUSTOMER_PERMISSIONS";
    pub const GRANT_CUSTOMER_PERMISSIONS: &str = "GRANT_CUSTOMER_PERMISSIONS";
    pub const REVOKE_CUSTOMER_PERMISSIONS: &str = "REVOKE_CUSTOMER_PERMISSIONS";

    /// Every permission name the engine knows about.
    pub const ALL: &[&str] = &[
        VIEW_OWN_CASE,
        VIEW_CASE,
        VIEW_ANY_CASE,
        VIEW_PUBLIC_CASE,
        EDIT_OWN_CASE,
        EDIT_CASE,
        EDIT_ANY_CASE,
        ASSIGN_OWN_CASE,
        ASSIGN_CASE,
        ASSIGN_ANY_CASE,
        REGISTER_CASE,
        VIEW_OWN_USER,
        VIEW_USER,
        VIEW_ANY_USER,
        VIEW_PUBLIC_USER,
        EDIT_OWN_USER,
        EDIT_USER,
        EDIT_ANY_USER,
        REGISTER_USER,
        VIEW_USER_PERMISSIONS,
        GRANT_USER_PERMISSIONS,
        REVOKE_USER_PERMISSIONS,
        VIEW_LAWYER_PERMISSIONS,
        GRANT_LAWYER_PERMISSIONS,
        REVOKE_LAWYER_PERMISSIONS,
        VIEW_CUSTOMER_PERMISSIONS,
        GRANT_CUSTOMER_PERMISSIONS,
        REVOKE_CUSTOMER_PERMISSIONS,
    ];
}
