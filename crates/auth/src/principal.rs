use serde::{Deserialize, Serialize};

use taskhub_core::{OrganizationId, UserId};

use crate::Role;

/// Whether a user currently belongs to an organization.
///
/// Every consumer has to handle the unaffiliated case explicitly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "organization_id")]
pub enum OrgMembership {
    Member(OrganizationId),
    #[default]
    Unaffiliated,
}

impl OrgMembership {
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            OrgMembership::Member(id) => Some(*id),
            OrgMembership::Unaffiliated => None,
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, OrgMembership::Member(_))
    }
}

impl From<Option<OrganizationId>> for OrgMembership {
    fn from(value: Option<OrganizationId>) -> Self {
        value.map_or(OrgMembership::Unaffiliated, OrgMembership::Member)
    }
}

/// An already-authenticated identity, as supplied on every call.
///
/// Construction is decoupled from storage and transport: the API derives it
/// from a verified session plus the current user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub membership: OrgMembership,
}

impl Actor {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        role: Role,
        membership: impl Into<OrgMembership>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            membership: membership.into(),
        }
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.membership.organization_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_from_option() {
        let org = OrganizationId::new();
        assert_eq!(OrgMembership::from(Some(org)), OrgMembership::Member(org));
        assert_eq!(OrgMembership::from(None), OrgMembership::Unaffiliated);
        assert!(!OrgMembership::Unaffiliated.is_member());
    }

    #[test]
    fn actor_exposes_organization() {
        let org = OrganizationId::new();
        let actor = Actor::new(UserId::new(), "a@example.com", Role::Admin, Some(org));
        assert_eq!(actor.organization_id(), Some(org));
    }
}
