//! Domain models for the permission engine

pub mod decision;
pub mod grant;
pub mod permission;
pub mod principal;
pub mod resource;

pub use decision::DecisionFlags;
pub use grant::{
    GrantBatchRequest, GrantFailureReason, GrantItemResult, GrantItemStatus, GrantOp,
    GrantRequestItem, GrantRow, GrantScope, GrantTuple, MAX_BATCH_ITEMS,
};
pub use permission::{names, Permission, PermissionId};
pub use principal::{Attribute, Persona, PersonaAttribute, Principal};
pub use resource::{AccessOutcome, ResourceKind, ResourceMeta, ResourceRef};
