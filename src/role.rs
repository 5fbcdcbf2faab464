//! Role hierarchy and rank comparisons.
//!
//! Roles form a strict total order: `trainee < manager < admin <
//! super_admin`. Every label outside that set maps to [`Role::Unknown`],
//! which ranks below the bottom of the hierarchy and holds no permissions.
//! Parsing is exact string match with no case normalization, and it never
//! fails: an unrecognized label degrades to `Unknown` so that a stale or
//! malformed role claim produces the most restrictive outcome instead of an
//! error.

use serde::{Deserialize, Serialize};

/// A user's privilege tier.
///
/// Higher rank = more privileged. `Unknown` is the fallback for any label
/// outside the catalog; it has rank −1 and is never treated as equal to a
/// real role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Trainee,
    Manager,
    Admin,
    SuperAdmin,
    /// Any label outside the hierarchy. No rank, no permissions.
    Unknown,
}

/// The ordered hierarchy, ascending by privilege.
pub const HIERARCHY: [Role; 4] = [Role::Trainee, Role::Manager, Role::Admin, Role::SuperAdmin];

impl Role {
    /// Canonical wire label for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Trainee => "trainee",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
            Role::Unknown => "unknown",
        }
    }

    /// Position in the hierarchy, or −1 for a role outside it.
    ///
    /// The sentinel sorts strictly below the lowest real rank, so every
    /// comparison against a real role reads as "insufficient".
    pub fn rank(self) -> i8 {
        HIERARCHY
            .iter()
            .position(|r| *r == self)
            .map(|i| i as i8)
            .unwrap_or(-1)
    }

    /// `true` iff `self` outranks `other` strictly.
    pub fn is_higher_than(self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// `true` iff `self` ranks at or above `other`.
    pub fn at_least(self, other: Role) -> bool {
        self.rank() >= other.rank()
    }

    /// Roles strictly below `self`, ascending by rank.
    ///
    /// These are the roles `self` may hand out, e.g. in an invite flow.
    /// The bottom of the hierarchy (and `Unknown`) gets an empty list.
    pub fn assignable_roles(self) -> Vec<Role> {
        let own = self.rank();
        HIERARCHY.iter().copied().filter(|r| r.rank() < own).collect()
    }
}

impl From<&str> for Role {
    fn from(label: &str) -> Self {
        match label {
            "trainee" => Role::Trainee,
            "manager" => Role::Manager,
            "admin" => Role::Admin,
            "super_admin" => Role::SuperAdmin,
            _ => Role::Unknown,
        }
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        Role::from(label.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
