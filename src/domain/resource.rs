//! Resource references, visibility metadata, and check outcomes

use crate::error::AppError;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Case,
    UserRelationship,
}

/// Reference to the resource a check applies to. Global actions pass no
/// resource at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Case(Uuid),
    UserRelationship(Uuid),
}

impl ResourceRef {
    pub fn id(&self) -> Uuid {
        match self {
            ResourceRef::Case(id) => *id,
            ResourceRef::UserRelationship(id) => *id,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Case(_) => ResourceKind::Case,
            ResourceRef::UserRelationship(_) => ResourceKind::UserRelationship,
        }
    }
}

/// Visibility attributes of a resource, fetched for view checks.
/// Ownership is derived from the creator (cases) or the related user
/// themselves (user-relationship records), never stored as a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct ResourceMeta {
    pub private: bool,
    pub owner_user_id: Uuid,
}

/// Tri-state outcome of a permission check.
///
/// A failed view check is always `NotFound`, never `Denied`: existence of a
/// resource must not leak to principals who cannot view it. `Denied` is only
/// produced for action checks after the view stage already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    Allowed,
    NotFound,
    Denied,
}

impl AccessOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessOutcome::Allowed)
    }

    /// Convenience for handlers: map the outcome onto the error taxonomy.
    pub fn into_result(self) -> crate::error::Result<()> {
        match self {
            AccessOutcome::Allowed => Ok(()),
            AccessOutcome::NotFound => Err(AppError::NotFound("Resource not found".to_string())),
            AccessOutcome::Denied => Err(AppError::Forbidden("Action not permitted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_accessors() {
        let id = Uuid::new_v4();
        let case = ResourceRef::Case(id);
        assert_eq!(case.id(), id);
        assert_eq!(case.kind(), ResourceKind::Case);

        let rel = ResourceRef::UserRelationship(id);
        assert_eq!(rel.kind(), ResourceKind::UserRelationship);
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(AccessOutcome::Allowed.into_result().is_ok());
        assert!(matches!(
            AccessOutcome::NotFound.into_result(),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            AccessOutcome::Denied.into_result(),
            Err(AppError::Forbidden(_))
        ));
    }
}
