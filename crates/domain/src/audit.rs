//! Audit log records.
//!
//! Entries are append-only: created once by the audit recorder, never updated
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use taskhub_core::{AuditEntryId, Entity, OrganizationId, UserId};

/// Maximum number of entries returned by an audit query.
pub const AUDIT_PAGE_SIZE: usize = 500;

/// Action tags.
pub mod actions {
    pub const TASK_CREATE: &str = "task:create";
    pub const TASK_UPDATE: &str = "task:update";
    pub const TASK_DELETE: &str = "task:delete";
    pub const ORGANIZATION_CREATE: &str = "organization:create";
    pub const ORGANIZATION_DELETE: &str = "organization:delete";
    pub const USER_SIGNUP: &str = "user:signup";
    pub const USER_LOGIN: &str = "user:login";
}

/// Entity kinds.
pub mod resources {
    pub const TASK: &str = "task";
    pub const ORGANIZATION: &str = "organization";
    pub const USER: &str = "user";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub organization_id: Option<OrganizationId>,
    /// `None` for system-originated events.
    pub user_id: Option<UserId>,
    pub action: String,
    pub resource: String,
    pub resource_id: String,
    pub details: Option<JsonValue>,
    pub timestamp: DateTime<Utc>,
}

impl Entity for AuditEntry {
    type Id = AuditEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Something worth recording, before it gets an id and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub user_id: Option<UserId>,
    pub organization_id: Option<OrganizationId>,
    pub action: String,
    pub resource: String,
    pub resource_id: String,
    pub details: Option<JsonValue>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            user_id: None,
            organization_id: None,
            action: action.into(),
            resource: resource.into(),
            resource_id: String::new(),
            details: None,
        }
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn in_organization(mut self, organization_id: Option<OrganizationId>) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn resource_id(mut self, resource_id: impl ToString) -> Self {
        self.resource_id = resource_id.to_string();
        self
    }

    pub fn details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    pub fn into_entry(self, timestamp: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id: AuditEntryId::new(),
            organization_id: self.organization_id,
            user_id: self.user_id,
            action: self.action,
            resource: self.resource,
            resource_id: self.resource_id,
            details: self.details,
            timestamp,
        }
    }
}

/// An audit entry joined with the originating user's identity, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    #[serde(flatten)]
    pub entry: AuditEntry,
    pub user_email: Option<String>,
}
