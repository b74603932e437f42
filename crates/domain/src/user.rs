use chrono::{DateTime, Utc};
use serde::Serialize;

use taskhub_auth::{Actor, OrgMembership, Role};
use taskhub_core::{Entity, OrganizationId, UserId};

/// A stored user.
///
/// `password_hash` is owned by the credential subsystem and is opaque here.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        organization_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            organization_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn membership(&self) -> OrgMembership {
        self.organization_id.into()
    }

    /// The identity this user acts with.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.email.clone(), self.role, self.membership())
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            organization_id: self.organization_id,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Public view of a user (no credential).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_credential() {
        let user = User::new("a@example.com", "$argon2id$secret", Role::Viewer, None, Utc::now());
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn actor_mirrors_membership() {
        let org = OrganizationId::new();
        let user = User::new("a@example.com", "h", Role::Admin, Some(org), Utc::now());
        let actor = user.actor();
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.membership, OrgMembership::Member(org));
    }
}
