use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhub_auth::OrgNode;
use taskhub_core::{DomainError, DomainResult, Entity, OrganizationId};

const MAX_NAME_LEN: usize = 255;

/// An organization. Roots have no parent; children point at a root.
///
/// # Invariants
/// - If `parent_id` is set, the parent's own `parent_id` is `None` (depth ≤ 2).
///   Enforced by the creation procedure in `taskhub_auth::access`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub parent_id: Option<OrganizationId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        name: &str,
        parent_id: Option<OrganizationId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: OrganizationId::new(),
            name: validate_name(name)?,
            parent_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn node(&self) -> OrgNode {
        OrgNode {
            id: self.id,
            parent_id: self.parent_id,
        }
    }
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::bad_request("organization name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::bad_request(format!(
            "organization name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
