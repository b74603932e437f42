//! Static role → permission table.
//!
//! The mapping is fixed at compile time: no persistence, no runtime mutation.
//! Anything that cannot be resolved to a known role gets no permissions.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Role;

/// A named capability granted to a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "task:create")]
    TaskCreate,
    #[serde(rename = "task:read")]
    TaskRead,
    #[serde(rename = "task:update")]
    TaskUpdate,
    #[serde(rename = "task:delete")]
    TaskDelete,
    #[serde(rename = "audit:read")]
    AuditRead,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::TaskCreate,
        Permission::TaskRead,
        Permission::TaskUpdate,
        Permission::TaskDelete,
        Permission::AuditRead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TaskCreate => "task:create",
            Permission::TaskRead => "task:read",
            Permission::TaskUpdate => "task:update",
            Permission::TaskDelete => "task:delete",
            Permission::AuditRead => "audit:read",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission '{s}'"))
    }
}

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::TaskCreate,
    Permission::TaskRead,
    Permission::TaskUpdate,
    Permission::TaskDelete,
    Permission::AuditRead,
];

const VIEWER_PERMISSIONS: &[Permission] = &[Permission::TaskRead];

/// Permissions granted to a role.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Owner | Role::Admin => MANAGER_PERMISSIONS,
        Role::Viewer => VIEWER_PERMISSIONS,
    }
}

/// Permissions for a role given by name. Unknown names fail closed.
pub fn permissions_for_role_name(name: &str) -> &'static [Permission] {
    match name.parse::<Role>() {
        Ok(role) => permissions_for(role),
        Err(_) => &[],
    }
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_is_read_only() {
        assert!(has_permission(Role::Viewer, Permission::TaskRead));
        assert!(!has_permission(Role::Viewer, Permission::TaskCreate));
        assert!(!has_permission(Role::Viewer, Permission::AuditRead));
    }

    #[test]
    fn owner_and_admin_share_the_full_set() {
        assert!(has_permission(Role::Owner, Permission::AuditRead));
        assert_eq!(permissions_for(Role::Owner), permissions_for(Role::Admin));
        assert_eq!(permissions_for(Role::Owner).len(), Permission::ALL.len());
    }

    #[test]
    fn unknown_role_name_gets_nothing() {
        assert!(permissions_for_role_name("root").is_empty());
        assert!(permissions_for_role_name("").is_empty());
        assert_eq!(permissions_for_role_name("viewer"), &[Permission::TaskRead]);
    }

    #[test]
    fn permission_names_round_trip() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_role() -> impl Strategy<Value = Role> {
            prop::sample::select(Role::ALL.to_vec())
        }

        fn any_permission() -> impl Strategy<Value = Permission> {
            prop::sample::select(Permission::ALL.to_vec())
        }

        proptest! {
            /// Property: the predicate agrees with the table for every pair.
            #[test]
            fn has_permission_matches_table(role in any_role(), permission in any_permission()) {
                prop_assert_eq!(
                    has_permission(role, permission),
                    permissions_for(role).contains(&permission)
                );
            }

            /// Property: arbitrary strings that are not role names resolve to nothing.
            #[test]
            fn arbitrary_names_fail_closed(name in "[A-Za-z]{1,12}") {
                prop_assume!(name.parse::<Role>().is_err());
                prop_assert!(permissions_for_role_name(&name).is_empty());
            }
        }
    }
}
