//! Role-transition validation.
//!
//! A role change is judged by an ordered sequence of guards evaluated
//! against the actor's role, the target's current role, and the proposed
//! new role. Guards short-circuit: the first failure decides the outcome
//! and its message, so the order is observable behavior.
//!
//! The validator has no side effects and no persisted state. Callers
//! persist the new role only after an allowed decision.

use crate::permission::{Policy, keys};
use crate::role::Role;

/// Outcome of a transition check.
///
/// `reason` is user-facing explanatory text, not a machine code. Callers
/// needing finer handling should treat any denial uniformly as
/// "authorization denied" and log the reason for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl Decision {
    /// An allowed decision, no message.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denied decision with a user-facing reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Validate a request by `actor` to move a user from `target_current` to
/// `target_new`.
///
/// Guards, in order:
/// 1. the actor holds `users:change_role`;
/// 2. the proposed role is strictly below the actor's own rank;
/// 3. the target's current role is strictly below the actor's own rank.
pub fn validate_role_transition(
    policy: &Policy,
    actor: Role,
    target_current: Role,
    target_new: Role,
) -> Decision {
    if !policy.has_permission(actor, keys::USERS_CHANGE_ROLE) {
        return Decision::deny("You do not have permission to change user roles");
    }

    if !actor.is_higher_than(target_new) {
        return Decision::deny("You cannot assign a role equal to or above your own");
    }

    if target_current.at_least(actor) {
        return Decision::deny("You cannot change the role of a user at or above your own role");
    }

    Decision::allow()
}
