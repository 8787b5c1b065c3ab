//! Batch grant/revoke orchestration over user-override grants.
//!
//! Every item in a batch is validated independently; one bad item never
//! blocks its siblings. Surviving items are written in a single transaction,
//! and the caller always gets exactly one result per submitted item.

use crate::domain::{
    GrantBatchRequest, GrantFailureReason, GrantItemResult, GrantItemStatus, GrantOp,
    GrantRequestItem, GrantScope, GrantTuple, Persona, Principal,
};
use crate::error::Result;
use crate::policy::{CapabilityValidator, DecisionEvaluator, PermissionCatalog};
use crate::repository::{
    AccountRepository, GrantRepository, IdentityRepository, PermissionRepository,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct GrantBatchService<G, A, I, P>
where
    G: GrantRepository,
    A: AccountRepository,
    I: IdentityRepository,
    P: PermissionRepository,
{
    catalog: Arc<PermissionCatalog>,
    evaluator: DecisionEvaluator<G, A>,
    capabilities: CapabilityValidator<A>,
    grants: Arc<G>,
    identities: Arc<I>,
    permissions: Arc<P>,
}

impl<G, A, I, P> Clone for GrantBatchService<G, A, I, P>
where
    G: GrantRepository,
    A: AccountRepository,
    I: IdentityRepository,
    P: PermissionRepository,
{
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            evaluator: self.evaluator.clone(),
            capabilities: self.capabilities.clone(),
            grants: Arc::clone(&self.grants),
            identities: Arc::clone(&self.identities),
            permissions: Arc::clone(&self.permissions),
        }
    }
}

impl<G, A, I, P> GrantBatchService<G, A, I, P>
where
    G: GrantRepository,
    A: AccountRepository,
    I: IdentityRepository,
    P: PermissionRepository,
{
    pub fn new(
        catalog: Arc<PermissionCatalog>,
        grants: Arc<G>,
        accounts: Arc<A>,
        identities: Arc<I>,
        permissions: Arc<P>,
    ) -> Self {
        let capabilities = CapabilityValidator::new(Arc::clone(&accounts));
        let evaluator = DecisionEvaluator::new(
            Arc::clone(&catalog),
            Arc::clone(&grants),
            CapabilityValidator::new(accounts),
        );
        Self {
            catalog,
            evaluator,
            capabilities,
            grants,
            identities,
            permissions,
        }
    }

    /// Entry point for a wire-level request: size limits first, then the
    /// per-item pipeline.
    pub async fn apply_request(
        &self,
        acting: &Principal,
        op: GrantOp,
        request: GrantBatchRequest,
    ) -> Result<Vec<GrantItemResult>> {
        request.validate()?;
        self.apply(acting, request.scope, op, request.items).await
    }

    pub async fn grant(
        &self,
        acting: &Principal,
        scope: GrantScope,
        items: Vec<GrantRequestItem>,
    ) -> Result<Vec<GrantItemResult>> {
        self.apply(acting, scope, GrantOp::Grant, items).await
    }

    pub async fn revoke(
        &self,
        acting: &Principal,
        scope: GrantScope,
        items: Vec<GrantRequestItem>,
    ) -> Result<Vec<GrantItemResult>> {
        self.apply(acting, scope, GrantOp::Revoke, items).await
    }

    /// Apply a batch. Returns `Err` only for faults before any per-item
    /// processing (the acting-principal evaluation or a batch lookup);
    /// everything after that point is reported per item, including a failed
    /// write, so partial validation work is never silently discarded.
    pub async fn apply(
        &self,
        acting: &Principal,
        scope: GrantScope,
        op: GrantOp,
        items: Vec<GrantRequestItem>,
    ) -> Result<Vec<GrantItemResult>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Duplicate correlation ids collapse onto their first occurrence:
        // the later copies mirror whatever outcome the first one gets.
        let mut first_index: HashMap<Uuid, usize> = HashMap::with_capacity(items.len());
        let mut unique: Vec<&GrantRequestItem> = Vec::with_capacity(items.len());
        for item in &items {
            if !first_index.contains_key(&item.correlation_id) {
                first_index.insert(item.correlation_id, unique.len());
                unique.push(item);
            }
        }

        // The scope is fixed for the whole call, so the acting principal is
        // evaluated once, not per item. The check gates only items that
        // survived their own validation; items that already failed keep
        // their specific reasons.
        let admin_names = [scope.view_permission(), scope.apply_permission(op)];
        let (statuses, admin_flags) = tokio::try_join!(
            self.validate_items(scope, &unique),
            self.evaluator.evaluate(acting, None, &admin_names),
        )?;

        let statuses = if admin_names.iter().all(|name| admin_flags.allows(name)) {
            self.write_survivors(op, &unique, statuses).await
        } else {
            tracing::warn!(
                acting_user_id = %acting.user_id,
                scope = ?scope,
                op = ?op,
                "grant batch rejected, acting principal lacks administration permissions"
            );
            statuses
                .into_iter()
                .map(|status| {
                    status.unwrap_or(GrantItemStatus::failed(
                        GrantFailureReason::ActingPrincipalDenied,
                    ))
                })
                .collect()
        };

        Ok(items
            .iter()
            .map(|item| GrantItemResult {
                correlation_id: item.correlation_id,
                status: statuses[first_index[&item.correlation_id]],
            })
            .collect())
    }

    /// Per-item validation against batch lookups. `None` marks a survivor.
    async fn validate_items(
        &self,
        scope: GrantScope,
        unique: &[&GrantRequestItem],
    ) -> Result<Vec<Option<GrantItemStatus>>> {
        let user_ids: Vec<Uuid> = unique.iter().map(|item| item.user_id).collect();
        let role_ids: Vec<Uuid> = unique.iter().map(|item| item.role_id).collect();
        let attribute_ids: Vec<Uuid> =
            unique.iter().filter_map(|item| item.attribute_id).collect();
        let permission_ids: Vec<Uuid> = unique
            .iter()
            .map(|item| item.permission_id.as_uuid())
            .collect();

        let (known_users, known_roles, known_attributes, known_permissions) = tokio::try_join!(
            self.identities.users_exist(&user_ids),
            self.identities.roles_exist(&role_ids),
            self.identities.find_attributes(&attribute_ids),
            self.permissions.exist(&permission_ids),
        )?;
        let attribute_personas: HashMap<Uuid, Persona> = known_attributes
            .iter()
            .filter_map(|attr| attr.persona().map(|persona| (attr.id, persona)))
            .collect();
        let known_attributes: HashSet<Uuid> =
            known_attributes.iter().map(|attr| attr.id).collect();

        // Unresolved whitelist names simply never match, which keeps an
        // incomplete catalog fail-closed here too.
        let grantable: HashSet<_> = scope
            .grantable_permissions()
            .iter()
            .map(|name| self.catalog.resolve(name))
            .filter(|id| !id.is_unresolved())
            .collect();

        // Every persona an item claims, via the batch scope or its own
        // attribute, must be backed by a linked account.
        let item_personas = |item: &GrantRequestItem| {
            scope.persona().into_iter().chain(
                item.attribute_id
                    .and_then(|id| attribute_personas.get(&id).copied()),
            )
        };
        let pairs: Vec<(Uuid, Persona)> = unique
            .iter()
            .filter(|item| known_users.contains(&item.user_id))
            .flat_map(|item| item_personas(item).map(|persona| (item.user_id, persona)))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let capable = self.capabilities.has_capabilities(&pairs).await?;

        let statuses = unique
            .iter()
            .map(|item| {
                if !known_users.contains(&item.user_id) {
                    return Some(GrantItemStatus::failed(GrantFailureReason::UnknownUser));
                }
                if !known_roles.contains(&item.role_id) {
                    return Some(GrantItemStatus::failed(GrantFailureReason::UnknownRole));
                }
                if let Some(attribute_id) = item.attribute_id {
                    if !known_attributes.contains(&attribute_id) {
                        return Some(GrantItemStatus::failed(
                            GrantFailureReason::UnknownAttribute,
                        ));
                    }
                }
                if !known_permissions.contains(&item.permission_id.as_uuid()) {
                    return Some(GrantItemStatus::failed(
                        GrantFailureReason::UnknownPermission,
                    ));
                }
                let incapable = item_personas(item).any(|persona| {
                    !capable
                        .get(&(item.user_id, persona))
                        .copied()
                        .unwrap_or(false)
                });
                if incapable {
                    return Some(GrantItemStatus::failed(
                        GrantFailureReason::PersonaNotCapable,
                    ));
                }
                if !grantable.contains(&item.permission_id) {
                    return Some(GrantItemStatus::failed(
                        GrantFailureReason::ForbiddenPermissionScope,
                    ));
                }
                None
            })
            .collect();

        Ok(statuses)
    }

    /// Write all surviving tuples in one transaction. A storage failure
    /// rolls the whole write back and downgrades every survivor to a
    /// `Storage` failure instead of bubbling up.
    async fn write_survivors(
        &self,
        op: GrantOp,
        unique: &[&GrantRequestItem],
        statuses: Vec<Option<GrantItemStatus>>,
    ) -> Vec<GrantItemStatus> {
        let tuples: Vec<GrantTuple> = unique
            .iter()
            .zip(&statuses)
            .filter(|(_, status)| status.is_none())
            .map(|(item, _)| item.tuple())
            .collect();

        let write = if tuples.is_empty() {
            Ok(())
        } else {
            match op {
                GrantOp::Grant => self.grants.insert_user_override_grants(&tuples).await,
                GrantOp::Revoke => self.grants.delete_user_override_grants(&tuples).await,
            }
        };

        let survivor_status = match write {
            Ok(()) => {
                tracing::info!(op = ?op, written = tuples.len(), "grant batch applied");
                GrantItemStatus::Succeeded
            }
            Err(err) => {
                tracing::error!(op = ?op, error = %err, "grant batch write failed, rolled back");
                GrantItemStatus::failed(GrantFailureReason::Storage)
            }
        };

        statuses
            .into_iter()
            .map(|status| status.unwrap_or(survivor_status))
            .collect()
    }
}
