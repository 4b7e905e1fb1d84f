use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Account roles. Stored as snake_case text in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Reads every report listing; cannot write
    Admin,
    /// Reads and writes everything, ignoring group scope
    Superuser,
    /// Reads every report listing; writes only for units in its allowed groups
    EntryAdmin,
    /// Public dashboards only
    Viewer,
}

/// What a role may do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_read_all: bool,
    pub can_bypass_group_scope: bool,
    pub can_write_own_group: bool,
}

impl Role {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Role::Superuser => Capabilities {
                can_read_all: true,
                can_bypass_group_scope: true,
                can_write_own_group: true,
            },
            Role::Admin => Capabilities {
                can_read_all: true,
                can_bypass_group_scope: false,
                can_write_own_group: false,
            },
            Role::EntryAdmin => Capabilities {
                can_read_all: true,
                can_bypass_group_scope: false,
                can_write_own_group: true,
            },
            Role::Viewer => Capabilities {
                can_read_all: false,
                can_bypass_group_scope: false,
                can_write_own_group: false,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superuser => "superuser",
            Role::EntryAdmin => "entry_admin",
            Role::Viewer => "viewer",
        }
    }

    /// Map a stored role name; unknown names get the least privileged role
    pub fn from_db(value: &str) -> Self {
        match value.trim() {
            "admin" => Role::Admin,
            "superuser" => Role::Superuser,
            "entry_admin" => Role::EntryAdmin,
            "viewer" => Role::Viewer,
            other => {
                tracing::warn!("Unknown role '{}' treated as viewer", other);
                Role::Viewer
            }
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split the stored comma-separated group list into a set
pub fn parse_allowed_groups(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table() {
        let su = Role::Superuser.capabilities();
        assert!(su.can_read_all && su.can_bypass_group_scope && su.can_write_own_group);

        let admin = Role::Admin.capabilities();
        assert!(admin.can_read_all);
        assert!(!admin.can_write_own_group);
        assert!(!admin.can_bypass_group_scope);

        let entry = Role::EntryAdmin.capabilities();
        assert!(entry.can_read_all && entry.can_write_own_group);
        assert!(!entry.can_bypass_group_scope);

        let viewer = Role::Viewer.capabilities();
        assert_eq!(
            viewer,
            Capabilities {
                can_read_all: false,
                can_bypass_group_scope: false,
                can_write_own_group: false
            }
        );
    }

    #[test]
    fn stored_names_round_trip() {
        for role in [Role::Admin, Role::Superuser, Role::EntryAdmin, Role::Viewer] {
            assert_eq!(Role::from_db(role.as_str()), role);
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, role.as_str());
        }
        assert_eq!(Role::from_db("operator"), Role::Viewer);
    }

    #[test]
    fn allowed_groups_are_trimmed_and_deduplicated() {
        let groups = parse_allowed_groups(Some("Pabrik, BKS,,Pabrik ,Packing Plant"));
        let expected: BTreeSet<String> = ["BKS", "Pabrik", "Packing Plant"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(groups, expected);

        assert!(parse_allowed_groups(None).is_empty());
        assert!(parse_allowed_groups(Some(" , ")).is_empty());
    }
}
