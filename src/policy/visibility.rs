//! Visibility resolution: decision flags + resource attributes -> outcome.
//!
//! The two-stage rule here is the load-bearing security property of the
//! engine: a failed view check yields `NotFound` so existence never leaks;
//! `Denied` only appears once the view stage has confirmed the resource to
//! the caller.

use crate::domain::{AccessOutcome, DecisionFlags, ResourceMeta};
use uuid::Uuid;

/// The three view flag scopes plus the public fallback for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRequirement {
    pub own: &'static str,
    pub scoped: &'static str,
    pub any: &'static str,
    pub public: &'static str,
}

impl ViewRequirement {
    pub fn flag_names(&self) -> [&'static str; 4] {
        [self.own, self.scoped, self.any, self.public]
    }
}

/// Which flags authorize a non-view action, by precedence scope. An absent
/// slot means the action has no flag at that scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRequirement {
    pub own: Option<&'static str>,
    pub scoped: Option<&'static str>,
    pub any: Option<&'static str>,
}

impl ActionRequirement {
    pub fn flag_names(&self) -> Vec<&'static str> {
        [self.own, self.scoped, self.any]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Resolve a view check. `Allowed` iff the principal owns the resource and
/// holds the own-view flag, or holds a scoped/any view flag, or the resource
/// is public and a public/any view flag is held. Everything else is
/// `NotFound`, never `Denied`.
pub fn resolve_view(
    flags: &DecisionFlags,
    requirement: &ViewRequirement,
    meta: &ResourceMeta,
    principal_user_id: Uuid,
) -> AccessOutcome {
    let owns = meta.owner_user_id == principal_user_id;

    if owns && flags.allows(requirement.own) {
        return AccessOutcome::Allowed;
    }
    if flags.allows(requirement.scoped) || flags.allows(requirement.any) {
        return AccessOutcome::Allowed;
    }
    if !meta.private && (flags.allows(requirement.public) || flags.allows(requirement.any)) {
        return AccessOutcome::Allowed;
    }

    AccessOutcome::NotFound
}

/// Resolve a non-view action. The view stage runs first and propagates its
/// `NotFound`; after a confirmed view, a missing action flag is `Denied`
/// (safe to reveal, the caller already knows the resource exists).
pub fn resolve_action(
    flags: &DecisionFlags,
    view: &ViewRequirement,
    action: &ActionRequirement,
    meta: &ResourceMeta,
    principal_user_id: Uuid,
) -> AccessOutcome {
    match resolve_view(flags, view, meta, principal_user_id) {
        AccessOutcome::Allowed => {}
        other => return other,
    }

    let owns = meta.owner_user_id == principal_user_id;
    if owns && action.own.is_some_and(|name| flags.allows(name)) {
        return AccessOutcome::Allowed;
    }
    if action.scoped.is_some_and(|name| flags.allows(name))
        || action.any.is_some_and(|name| flags.allows(name))
    {
        return AccessOutcome::Allowed;
    }

    AccessOutcome::Denied
}
