//! Decision evaluator: aggregates the three grant layers into decision flags.
//!
//! The single parameterized algorithm behind every permission check; handlers
//! differ only in which flag names they request.

use super::capability::CapabilityValidator;
use super::catalog::PermissionCatalog;
use crate::domain::{DecisionFlags, GrantRow, Principal, ResourceRef};
use crate::error::Result;
use crate::repository::{AccountRepository, GrantRepository};
use std::sync::Arc;

pub struct DecisionEvaluator<G: GrantRepository, A: AccountRepository> {
    catalog: Arc<PermissionCatalog>,
    grants: Arc<G>,
    capabilities: CapabilityValidator<A>,
}

impl<G: GrantRepository, A: AccountRepository> Clone for DecisionEvaluator<G, A> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            grants: Arc::clone(&self.grants),
            capabilities: self.capabilities.clone(),
        }
    }
}

impl<G: GrantRepository, A: AccountRepository> DecisionEvaluator<G, A> {
    pub fn new(
        catalog: Arc<PermissionCatalog>,
        grants: Arc<G>,
        capabilities: CapabilityValidator<A>,
    ) -> Self {
        Self {
            catalog,
            grants,
            capabilities,
        }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Evaluate the requested permission names for a principal and optional
    /// resource. Pure over its inputs: no writes, safe to call redundantly
    /// and in parallel within one request.
    ///
    /// A flag is true iff at least one row across the three additive layers
    /// carries the permission and either applies to any persona
    /// (`attribute_id` NULL) or matches the principal's persona, with the
    /// persona genuinely held. Aggregation is any-match: no layer can
    /// suppress another.
    pub async fn evaluate(
        &self,
        principal: &Principal,
        resource: Option<&ResourceRef>,
        names: &[&str],
    ) -> Result<DecisionFlags> {
        let acl = async {
            match resource {
                Some(ResourceRef::Case(case_id)) => {
                    self.grants
                        .find_case_acl_grants(*case_id, principal.user_id, principal.role_id)
                        .await
                }
                Some(ResourceRef::UserRelationship(related_user_id)) => {
                    self.grants
                        .find_relationship_acl_grants(
                            *related_user_id,
                            principal.user_id,
                            principal.role_id,
                        )
                        .await
                }
                None => Ok(Vec::new()),
            }
        };

        let (role_rows, override_rows, acl_rows) = tokio::try_join!(
            self.grants.find_role_grants(principal.role_id),
            self.grants
                .find_user_override_grants(principal.user_id, principal.role_id),
            acl,
        )?;

        let mut rows = role_rows;
        rows.extend(override_rows);
        rows.extend(acl_rows);

        // Only the principal's own attribute can satisfy a persona-scoped
        // row, so at most one capability lookup is needed, and only when
        // some row actually references that attribute.
        let persona_capable = match &principal.attribute {
            Some(attr)
                if rows
                    .iter()
                    .any(|row| row.attribute_id == Some(attr.attribute_id)) =>
            {
                self.capabilities
                    .has_capability(principal.user_id, attr.persona)
                    .await?
            }
            _ => false,
        };

        let mut flags = DecisionFlags::new();
        for name in names {
            let permission_id = self.catalog.resolve(name);
            let allowed = !permission_id.is_unresolved()
                && rows
                    .iter()
                    .any(|row| row_matches(row, permission_id, principal, persona_capable));
            flags.set(name, allowed);
        }

        tracing::trace!(
            user_id = %principal.user_id,
            role_id = %principal.role_id,
            requested = names.len(),
            "decision flags evaluated"
        );
        Ok(flags)
    }
}

fn row_matches(
    row: &GrantRow,
    permission_id: crate::domain::PermissionId,
    principal: &Principal,
    persona_capable: bool,
) -> bool {
    if row.permission_id != permission_id {
        return false;
    }
    match row.attribute_id {
        None => true,
        Some(attribute_id) => {
            principal.attribute_id() == Some(attribute_id) && persona_capable
        }
    }
}
