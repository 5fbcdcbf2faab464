//! Permission catalog and the role → grant policy table.
//!
//! Permissions are `resource:action` string keys from a fixed catalog. The
//! [`Policy`] value maps each role to its granted keys and answers the
//! membership queries route handlers ask before touching data. It is built
//! once at startup (the compiled-in default or a TOML policy file) and
//! shared immutably; queries are pure and total.
//!
//! Unknown inputs fail closed: a role absent from the table has the empty
//! grant set, and membership tests on it return `false`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::role::Role;
use crate::{Error, Result};

/// Permission key constants.
///
/// Use these instead of string literals so the compiler catches typos and
/// refactors stay mechanical.
pub mod keys {
    /// View user profiles.
    pub const USERS_VIEW: &str = "users:view";
    /// Invite new users.
    pub const USERS_INVITE: &str = "users:invite";
    /// Edit user profiles.
    pub const USERS_EDIT: &str = "users:edit";
    /// Deactivate or delete users.
    pub const USERS_DELETE: &str = "users:delete";
    /// Change another user's role.
    pub const USERS_CHANGE_ROLE: &str = "users:change_role";

    /// View training sessions.
    pub const SESSIONS_VIEW: &str = "sessions:view";
    /// Start a practice call.
    pub const SESSIONS_START: &str = "sessions:start";
    /// Review and adjust coaching scores.
    pub const SESSIONS_SCORE: &str = "sessions:score";
    /// Delete training sessions.
    pub const SESSIONS_DELETE: &str = "sessions:delete";

    /// View call scenarios.
    pub const SCENARIOS_VIEW: &str = "scenarios:view";
    /// Author and edit call scenarios.
    pub const SCENARIOS_EDIT: &str = "scenarios:edit";

    /// View progress reports.
    pub const REPORTS_VIEW: &str = "reports:view";
    /// Export progress reports.
    pub const REPORTS_EXPORT: &str = "reports:export";

    /// View workspace settings.
    pub const SETTINGS_VIEW: &str = "settings:view";
    /// Edit workspace settings.
    pub const SETTINGS_EDIT: &str = "settings:edit";
}

/// The built-in catalog: every known permission key with its description.
/// Descriptions are documentation, never evaluated.
const CATALOG: &[(&str, &str)] = &[
    (keys::USERS_VIEW, "View user profiles"),
    (keys::USERS_INVITE, "Invite new users"),
    (keys::USERS_EDIT, "Edit user profiles"),
    (keys::USERS_DELETE, "Deactivate or delete users"),
    (keys::USERS_CHANGE_ROLE, "Change another user's role"),
    (keys::SESSIONS_VIEW, "View training sessions"),
    (keys::SESSIONS_START, "Start a practice call"),
    (keys::SESSIONS_SCORE, "Review and adjust coaching scores"),
    (keys::SESSIONS_DELETE, "Delete training sessions"),
    (keys::SCENARIOS_VIEW, "View call scenarios"),
    (keys::SCENARIOS_EDIT, "Author and edit call scenarios"),
    (keys::REPORTS_VIEW, "View progress reports"),
    (keys::REPORTS_EXPORT, "Export progress reports"),
    (keys::SETTINGS_VIEW, "View workspace settings"),
    (keys::SETTINGS_EDIT, "Edit workspace settings"),
];

/// Built-in grants per role, ascending by rank. Each tier is authored as a
/// superset of the one below; that monotonicity is a data discipline, not a
/// runtime check. The top tier is intentionally absent here: it receives
/// the whole catalog at construction.
const GRANTS: &[(Role, &[&str])] = &[
    (
        Role::Trainee,
        &[keys::SESSIONS_VIEW, keys::SESSIONS_START, keys::SCENARIOS_VIEW],
    ),
    (
        Role::Manager,
        &[
            keys::SESSIONS_VIEW,
            keys::SESSIONS_START,
            keys::SCENARIOS_VIEW,
            keys::USERS_VIEW,
            keys::USERS_INVITE,
            keys::USERS_CHANGE_ROLE,
            keys::SESSIONS_SCORE,
            keys::REPORTS_VIEW,
            keys::REPORTS_EXPORT,
        ],
    ),
    (
        Role::Admin,
        &[
            keys::SESSIONS_VIEW,
            keys::SESSIONS_START,
            keys::SCENARIOS_VIEW,
            keys::USERS_VIEW,
            keys::USERS_INVITE,
            keys::USERS_CHANGE_ROLE,
            keys::SESSIONS_SCORE,
            keys::REPORTS_VIEW,
            keys::REPORTS_EXPORT,
            keys::USERS_EDIT,
            keys::USERS_DELETE,
            keys::SESSIONS_DELETE,
            keys::SCENARIOS_EDIT,
            keys::SETTINGS_VIEW,
        ],
    ),
];

fn empty_grants() -> &'static BTreeSet<String> {
    static EMPTY: LazyLock<BTreeSet<String>> = LazyLock::new(BTreeSet::new);
    &EMPTY
}

/// On-disk policy document.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    catalog: BTreeMap<String, String>,
    grants: BTreeMap<String, Vec<String>>,
}

/// Immutable role → permission table.
///
/// Construct once ([`Policy::builtin`] or [`Policy::load`]) and inject it
/// into the service state; there is no global instance.
#[derive(Debug, Clone)]
pub struct Policy {
    catalog: BTreeMap<String, String>,
    grants: HashMap<Role, BTreeSet<String>>,
}

impl Policy {
    /// The compiled-in reference policy.
    pub fn builtin() -> Self {
        let catalog: BTreeMap<String, String> = CATALOG
            .iter()
            .map(|(k, d)| (k.to_string(), d.to_string()))
            .collect();

        let mut grants: HashMap<Role, BTreeSet<String>> = GRANTS
            .iter()
            .map(|(role, keys)| (*role, keys.iter().map(|k| k.to_string()).collect()))
            .collect();

        // The top tier holds every catalog key. Computed, never authored,
        // so catalog growth reaches it automatically.
        grants.insert(Role::SuperAdmin, catalog.keys().cloned().collect());

        Self { catalog, grants }
    }

    /// Load a policy from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read policy file: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse a policy from TOML text.
    ///
    /// Role labels outside the hierarchy and grant keys outside the catalog
    /// are authoring errors and rejected here, at load, rather than left to
    /// silently grant nothing at query time.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PolicyFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse policy file: {e}")))?;

        let mut grants: HashMap<Role, BTreeSet<String>> = HashMap::new();
        for (label, keys) in file.grants {
            let role = Role::from(label.as_str());
            if role == Role::Unknown {
                return Err(Error::Config(format!(
                    "Policy file grants permissions to unknown role '{label}'"
                )));
            }
            for key in &keys {
                if !file.catalog.contains_key(key) {
                    return Err(Error::Config(format!(
                        "Policy file grants '{key}' to '{label}' but the catalog does not define it"
                    )));
                }
            }
            grants.insert(role, keys.into_iter().collect());
        }

        grants.insert(Role::SuperAdmin, file.catalog.keys().cloned().collect());

        Ok(Self {
            catalog: file.catalog,
            grants,
        })
    }

    /// `true` iff `role` holds `key`.
    pub fn has_permission(&self, role: Role, key: &str) -> bool {
        self.grants.get(&role).is_some_and(|set| set.contains(key))
    }

    /// `true` iff `role` holds at least one of `keys`.
    ///
    /// An empty list has no satisfiable member, so the answer is `false`.
    pub fn has_any(&self, role: Role, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.has_permission(role, key))
    }

    /// `true` iff `role` holds every key in `keys`.
    ///
    /// Vacuously `true` for the empty list, including for unknown roles:
    /// the identity element for "all tests pass".
    pub fn has_all(&self, role: Role, keys: &[&str]) -> bool {
        keys.iter().all(|key| self.has_permission(role, key))
    }

    /// Every key granted to `role`; the empty set for roles outside the
    /// table.
    pub fn role_permissions(&self, role: Role) -> &BTreeSet<String> {
        self.grants.get(&role).unwrap_or_else(|| empty_grants())
    }

    /// Catalog description for `key`, if the catalog defines it.
    pub fn describe(&self, key: &str) -> Option<&str> {
        self.catalog.get(key).map(|s| s.as_str())
    }

    /// Number of keys in the catalog.
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}
