//! Centralized permission engine for case and user-relationship handlers.
//!
//! Handlers never touch grant rows directly: they describe the action they
//! need through an [`ActionRequirement`] and receive a tri-state
//! [`AccessOutcome`] back.

pub mod capability;
pub mod catalog;
pub mod evaluator;
pub mod visibility;

pub use capability::CapabilityValidator;
pub use catalog::PermissionCatalog;
pub use evaluator::DecisionEvaluator;
pub use visibility::{ActionRequirement, ViewRequirement};

use crate::domain::{names, AccessOutcome, DecisionFlags, Principal, ResourceKind, ResourceMeta, ResourceRef};
use crate::error::Result;
use crate::repository::{AccountRepository, GrantRepository, ResourceMetaRepository};
use std::sync::Arc;

/// View flag set per resource kind.
pub fn view_requirement(kind: ResourceKind) -> ViewRequirement {
    match kind {
        ResourceKind::Case => ViewRequirement {
            own: names::VIEW_OWN_CASE,
            scoped: names::VIEW_CASE,
            any: names::VIEW_ANY_CASE,
            public: names::VIEW_PUBLIC_CASE,
        },
        ResourceKind::UserRelationship => ViewRequirement {
            own: names::VIEW_OWN_USER,
            scoped: names::VIEW_USER,
            any: names::VIEW_ANY_USER,
            public: names::VIEW_PUBLIC_USER,
        },
    }
}

impl ActionRequirement {
    pub const fn edit_case() -> Self {
        Self {
            own: Some(names::EDIT_OWN_CASE),
            scoped: Some(names::EDIT_CASE),
            any: Some(names::EDIT_ANY_CASE),
        }
    }

    pub const fn assign_case() -> Self {
        Self {
            own: Some(names::ASSIGN_OWN_CASE),
            scoped: Some(names::ASSIGN_CASE),
            any: Some(names::ASSIGN_ANY_CASE),
        }
    }

    pub const fn edit_user() -> Self {
        Self {
            own: Some(names::EDIT_OWN_USER),
            scoped: Some(names::EDIT_USER),
            any: Some(names::EDIT_ANY_USER),
        }
    }
}

/// The engine facade exposed to CRUD handlers.
pub struct PermissionEngine<G, A, R>
where
    G: GrantRepository,
    A: AccountRepository,
    R: ResourceMetaRepository,
{
    evaluator: DecisionEvaluator<G, A>,
    resources: Arc<R>,
}

impl<G, A, R> Clone for PermissionEngine<G, A, R>
where
    G: GrantRepository,
    A: AccountRepository,
    R: ResourceMetaRepository,
{
    fn clone(&self) -> Self {
        Self {
            evaluator: self.evaluator.clone(),
            resources: Arc::clone(&self.resources),
        }
    }
}

impl<G, A, R> PermissionEngine<G, A, R>
where
    G: GrantRepository,
    A: AccountRepository,
    R: ResourceMetaRepository,
{
    pub fn new(
        catalog: Arc<PermissionCatalog>,
        grants: Arc<G>,
        accounts: Arc<A>,
        resources: Arc<R>,
    ) -> Self {
        let capabilities = CapabilityValidator::new(accounts);
        Self {
            evaluator: DecisionEvaluator::new(catalog, grants, capabilities),
            resources,
        }
    }

    pub fn evaluator(&self) -> &DecisionEvaluator<G, A> {
        &self.evaluator
    }

    /// View check: `Allowed` or `NotFound`, never `Denied`.
    pub async fn check_view(
        &self,
        principal: &Principal,
        resource: &ResourceRef,
    ) -> Result<AccessOutcome> {
        let Some(meta) = self.fetch_meta(resource).await? else {
            return Ok(AccessOutcome::NotFound);
        };

        let view = view_requirement(resource.kind());
        let flags = self
            .evaluator
            .evaluate(principal, Some(resource), &view.flag_names())
            .await?;

        Ok(visibility::resolve_view(
            &flags,
            &view,
            &meta,
            principal.user_id,
        ))
    }

    /// Action check: the view stage runs first; only a confirmed view can
    /// surface `Denied`.
    pub async fn check_action(
        &self,
        principal: &Principal,
        resource: &ResourceRef,
        requirement: &ActionRequirement,
    ) -> Result<AccessOutcome> {
        let Some(meta) = self.fetch_meta(resource).await? else {
            return Ok(AccessOutcome::NotFound);
        };

        let view = view_requirement(resource.kind());
        let mut requested: Vec<&str> = view.flag_names().to_vec();
        requested.extend(requirement.flag_names());

        let flags = self
            .evaluator
            .evaluate(principal, Some(resource), &requested)
            .await?;

        Ok(visibility::resolve_action(
            &flags,
            &view,
            requirement,
            &meta,
            principal.user_id,
        ))
    }

    /// Flags for non-resource actions (registration, global listings).
    pub async fn evaluate_global(
        &self,
        principal: &Principal,
        names: &[&str],
    ) -> Result<DecisionFlags> {
        self.evaluator.evaluate(principal, None, names).await
    }

    async fn fetch_meta(&self, resource: &ResourceRef) -> Result<Option<ResourceMeta>> {
        match resource {
            ResourceRef::Case(case_id) => self.resources.find_case_meta(*case_id).await,
            ResourceRef::UserRelationship(user_id) => {
                self.resources.find_user_meta(*user_id).await
            }
        }
    }
}
