//! Grant rows, batch grant/revoke requests, and per-item results

use super::permission::{names, PermissionId};
use super::principal::Persona;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Items accepted per batch request.
pub const MAX_BATCH_ITEMS: u64 = 100;

/// One row from any of the three grant layers, projected down to the two
/// columns the evaluator needs. `attribute_id` NULL means the grant applies
/// to any persona.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct GrantRow {
    pub permission_id: PermissionId,
    pub attribute_id: Option<Uuid>,
}

/// A user-override grant tuple, the unit the batch orchestrator writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantTuple {
    pub user_id: Uuid,
    pub permission_id: PermissionId,
    pub role_id: Uuid,
    pub attribute_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantOp {
    Grant,
    Revoke,
}

/// One item of a batch grant/revoke request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequestItem {
    /// Caller-chosen id correlating this item with its result
    pub correlation_id: Uuid,
    pub user_id: Uuid,
    pub permission_id: PermissionId,
    pub role_id: Uuid,
    pub attribute_id: Option<Uuid>,
}

/// A full batch request as submitted over the wire.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GrantBatchRequest {
    pub scope: GrantScope,
    #[validate(length(min = 1, max = MAX_BATCH_ITEMS))]
    pub items: Vec<GrantRequestItem>,
}

impl GrantRequestItem {
    pub fn tuple(&self) -> GrantTuple {
        GrantTuple {
            user_id: self.user_id,
            permission_id: self.permission_id,
            role_id: self.role_id,
            attribute_id: self.attribute_id,
        }
    }
}

/// Which account kind a batch targets. Each scope carries its own whitelist
/// of grantable permissions and its own administration permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantScope {
    PlainUser,
    LawyerAccount,
    CustomerAccount,
}

impl GrantScope {
    /// Permissions that may be granted or revoked within this scope.
    pub fn grantable_permissions(&self) -> &'static [&'static str] {
        match self {
            GrantScope::PlainUser => &[
                names::VIEW_OWN_CASE,
                names::VIEW_CASE,
                names::VIEW_PUBLIC_CASE,
                names::EDIT_OWN_CASE,
                names::REGISTER_CASE,
                names::VIEW_OWN_USER,
                names::VIEW_USER,
                names::VIEW_PUBLIC_USER,
                names::EDIT_OWN_USER,
            ],
            GrantScope::LawyerAccount => &[
                names::VIEW_OWN_CASE,
                names::VIEW_CASE,
                names::VIEW_ANY_CASE,
                names::EDIT_CASE,
                names::EDIT_ANY_CASE,
                names::ASSIGN_CASE,
                names::ASSIGN_ANY_CASE,
                names::VIEW_USER,
                names::VIEW_ANY_USER,
            ],
            GrantScope::CustomerAccount => &[
                names::VIEW_OWN_CASE,
                names::VIEW_PUBLIC_CASE,
                names::EDIT_OWN_CASE,
                names::REGISTER_CASE,
                names::VIEW_OWN_USER,
                names::EDIT_OWN_USER,
            ],
        }
    }

    /// Permission the acting principal needs to see grants in this scope.
    pub fn view_permission(&self) -> &'static str {
        match self {
            GrantScope::PlainUser => names::VIEW_USER_PERMISSIONS,
            GrantScope::LawyerAccount => names::VIEW_LAWYER_PERMISSIONS,
            GrantScope::CustomerAccount => names::VIEW_CUSTOMER_PERMISSIONS,
        }
    }

    /// Permission the acting principal needs to apply `op` in this scope.
    pub fn apply_permission(&self, op: GrantOp) -> &'static str {
        match (self, op) {
            (GrantScope::PlainUser, GrantOp::Grant) => names::GRANT_USER_PERMISSIONS,
            (GrantScope::PlainUser, GrantOp::Revoke) => names::REVOKE_USER_PERMISSIONS,
            (GrantScope::LawyerAccount, GrantOp::Grant) => names::GRANT_LAWYER_PERMISSIONS,
            (GrantScope::LawyerAccount, GrantOp::Revoke) => names::REVOKE_LAWYER_PERMISSIONS,
            (GrantScope::CustomerAccount, GrantOp::Grant) => names::GRANT_CUSTOMER_PERMISSIONS,
            (GrantScope::CustomerAccount, GrantOp::Revoke) => names::REVOKE_CUSTOMER_PERMISSIONS,
        }
    }

    /// The persona whose linked account this scope targets, if any.
    pub fn persona(&self) -> Option<Persona> {
        match self {
            GrantScope::PlainUser => None,
            GrantScope::LawyerAccount => Some(Persona::Lawyer),
            GrantScope::CustomerAccount => Some(Persona::Customer),
        }
    }
}

/// Why one batch item failed. Local, recoverable-by-caller conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantFailureReason {
    #[error("unknown user id")]
    UnknownUser,
    #[error("unknown role id")]
    UnknownRole,
    #[error("unknown attribute id")]
    UnknownAttribute,
    #[error("unknown permission id")]
    UnknownPermission,
    #[error("user lacks the account backing the claimed persona")]
    PersonaNotCapable,
    #[error("permission is not grantable in this scope")]
    ForbiddenPermissionScope,
    #[error("acting principal may not administer grants in this scope")]
    ActingPrincipalDenied,
    #[error("storage write failed, batch rolled back")]
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GrantItemStatus {
    Succeeded,
    Failed { reason: GrantFailureReason },
}

impl GrantItemStatus {
    pub fn failed(reason: GrantFailureReason) -> Self {
        GrantItemStatus::Failed { reason }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, GrantItemStatus::Succeeded)
    }
}

/// Per-item outcome of a batch apply. The result list always has exactly one
/// entry per original input item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantItemResult {
    pub correlation_id: Uuid,
    #[serde(flatten)]
    pub status: GrantItemStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_whitelists_are_subsets_of_catalog() {
        for scope in [
            GrantScope::PlainUser,
            GrantScope::LawyerAccount,
            GrantScope::CustomerAccount,
        ] {
            for name in scope.grantable_permissions() {
                assert!(names::ALL.contains(name), "{name} missing from catalog");
            }
        }
    }

    #[test]
    fn test_scope_admin_permissions() {
        assert_eq!(
            GrantScope::LawyerAccount.apply_permission(GrantOp::Grant),
            names::GRANT_LAWYER_PERMISSIONS
        );
        assert_eq!(
            GrantScope::CustomerAccount.apply_permission(GrantOp::Revoke),
            names::REVOKE_CUSTOMER_PERMISSIONS
        );
        assert_eq!(
            GrantScope::PlainUser.view_permission(),
            names::VIEW_USER_PERMISSIONS
        );
    }

    #[test]
    fn test_scope_personas() {
        assert_eq!(GrantScope::PlainUser.persona(), None);
        assert_eq!(GrantScope::LawyerAccount.persona(), Some(Persona::Lawyer));
        assert_eq!(
            GrantScope::CustomerAccount.persona(),
            Some(Persona::Customer)
        );
    }

    #[test]
    fn test_request_item_tuple() {
        let item = GrantRequestItem {
            correlation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            permission_id: PermissionId::new(Uuid::new_v4()),
            role_id: Uuid::new_v4(),
            attribute_id: None,
        };
        let tuple = item.tuple();
        assert_eq!(tuple.user_id, item.user_id);
        assert_eq!(tuple.permission_id, item.permission_id);
    }

    #[test]
    fn test_request_item_round_trips_over_the_wire() {
        let item = GrantRequestItem {
            correlation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            permission_id: PermissionId::new(Uuid::new_v4()),
            role_id: Uuid::new_v4(),
            attribute_id: Some(Uuid::new_v4()),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: GrantRequestItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_batch_request_size_limit() {
        use validator::Validate;

        let item = GrantRequestItem {
            correlation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            permission_id: PermissionId::new(Uuid::new_v4()),
            role_id: Uuid::new_v4(),
            attribute_id: None,
        };
        let request = GrantBatchRequest {
            scope: GrantScope::PlainUser,
            items: vec![item.clone(); MAX_BATCH_ITEMS as usize + 1],
        };
        assert!(request.validate().is_err());

        let request = GrantBatchRequest {
            scope: GrantScope::PlainUser,
            items: vec![item],
        };
        assert!(request.validate().is_ok());
    }
}
