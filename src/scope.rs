//! Data-scope resolution: which rows of which tables a role may reach.
//!
//! A role resolves to one of three scopes (`own`, `team`, `all`) and the
//! [`ScopeRules`] registry turns a `(caller, table)` pair into a
//! [`ScopeFilter`]: a declarative list of column/value equalities the query
//! layer must AND onto any read or write against that table. The filter is
//! data, not SQL; rendering happens in [`crate::db`].
//!
//! The registry is a whitelist. Tables it does not know about resolve to an
//! unrestricted filter under every scope, an intentional open surface
//! inherited from the reference policy. Adding a table to the system means
//! registering it here, not editing a conditional.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::role::Role;

/// Breadth of data rows a role may access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataScope {
    /// Only rows the caller owns.
    Own,
    /// Rows belonging to the caller's branch.
    Team,
    /// No row restriction. Tenant boundaries are an outer layer's job and
    /// are not re-derived here.
    All,
}

impl DataScope {
    /// Scope for `role`. Anything outside the hierarchy, including
    /// `Unknown`, resolves to the most restrictive scope, not the least.
    pub fn of(role: Role) -> DataScope {
        match role {
            Role::Admin | Role::SuperAdmin => DataScope::All,
            Role::Manager => DataScope::Team,
            Role::Trainee | Role::Unknown => DataScope::Own,
        }
    }
}

/// Identity attributes the scope rules read from the caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    /// The caller's user id.
    pub id: &'a str,
    /// The caller's role as resolved from the session.
    pub role: Role,
    /// The caller's branch, if assigned.
    pub branch_id: Option<&'a str>,
}

/// A declarative row restriction: column/value equalities to AND onto a
/// query. Empty means unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeFilter(Vec<(String, String)>);

impl ScopeFilter {
    /// The filter that restricts nothing.
    pub fn unrestricted() -> Self {
        Self(Vec::new())
    }

    /// A single-column equality filter.
    pub fn eq(column: &str, value: &str) -> Self {
        Self(vec![(column.to_string(), value.to_string())])
    }

    /// `true` iff this filter restricts nothing.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// The column/value pairs, in application order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Registry of per-table scope rules.
///
/// Two maps drive resolution: `branch_scoped` names the tables a `team`
/// caller is restricted on (and the branch column to match), `owned` names
/// the tables an `own` caller is restricted on (and the owner column to
/// match). Everything else falls through to [`ScopeFilter::unrestricted`].
#[derive(Debug, Clone)]
pub struct ScopeRules {
    branch_scoped: BTreeMap<String, String>,
    owned: BTreeMap<String, String>,
}

impl ScopeRules {
    /// The reference registry: `users` and `training_sessions` are branch
    /// scoped; ownership is `id` on `users` and `user_id` on session and
    /// assignment tables.
    pub fn builtin() -> Self {
        let mut rules = Self {
            branch_scoped: BTreeMap::new(),
            owned: BTreeMap::new(),
        };
        rules.register_branch_scoped("users", "branch_id");
        rules.register_branch_scoped("training_sessions", "branch_id");
        rules.register_owned("users", "id");
        rules.register_owned("training_sessions", "user_id");
        rules.register_owned("assignments", "user_id");
        rules
    }

    /// Restrict `table` by `column = caller.branch_id` under `team` scope.
    pub fn register_branch_scoped(&mut self, table: &str, column: &str) {
        self.branch_scoped.insert(table.to_string(), column.to_string());
    }

    /// Restrict `table` by `column = caller.id` under `own` scope.
    pub fn register_owned(&mut self, table: &str, column: &str) {
        self.owned.insert(table.to_string(), column.to_string());
    }

    /// Resolve the filter for `caller` reading or writing `table`.
    ///
    /// `team` scope on a branch-scoped table with no branch on the caller
    /// is an explicit no-restriction fallback, not a deny; callers must
    /// not assume team scope is enforced on every table.
    pub fn filter_for(&self, caller: &Caller<'_>, table: &str) -> ScopeFilter {
        match DataScope::of(caller.role) {
            DataScope::All => ScopeFilter::unrestricted(),
            DataScope::Team => match (self.branch_scoped.get(table), caller.branch_id) {
                (Some(column), Some(branch)) => ScopeFilter::eq(column, branch),
                _ => ScopeFilter::unrestricted(),
            },
            DataScope::Own => match self.owned.get(table) {
                Some(column) => ScopeFilter::eq(column, caller.id),
                None => ScopeFilter::unrestricted(),
            },
        }
    }
}
