//! The audit recorder: sole writer of the audit log.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use taskhub_auth::{require_permission, Actor, Permission};
use taskhub_core::DomainResult;
use taskhub_domain::{AuditEntry, AuditEvent, AuditPolicy, AuditRecord, AUDIT_PAGE_SIZE};
use taskhub_infra::{AuditLogRepository, OrganizationRepository};

use crate::scope::accessible_organizations;

pub struct AuditRecorder {
    log: Arc<dyn AuditLogRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    policy: AuditPolicy,
}

impl AuditRecorder {
    pub fn new(
        log: Arc<dyn AuditLogRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        policy: AuditPolicy,
    ) -> Self {
        Self {
            log,
            organizations,
            policy,
        }
    }

    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    /// Persist one entry. Storage failures always propagate.
    pub async fn log(&self, event: AuditEvent) -> DomainResult<AuditEntry> {
        let entry = event.into_entry(Utc::now());
        self.log.append(&entry).await?;
        debug!(
            action = %entry.action,
            resource = %entry.resource,
            resource_id = %entry.resource_id,
            "audit entry recorded"
        );
        Ok(entry)
    }

    /// Record the audit trail of a mutation that already happened.
    ///
    /// Under `BestEffort` a failed write is logged and swallowed.
    pub async fn record(&self, event: AuditEvent) -> DomainResult<()> {
        let action = event.action.clone();
        match self.log(event).await {
            Ok(_) => Ok(()),
            Err(err) if self.policy == AuditPolicy::BestEffort => {
                warn!(%action, error = %err, "audit write failed; continuing");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Entries visible to the actor, newest first, at most `AUDIT_PAGE_SIZE`.
    pub async fn find_all(&self, actor: &Actor) -> DomainResult<Vec<AuditRecord>> {
        require_permission(actor, Permission::AuditRead)?;
        let Some(home) = actor.organization_id() else {
            debug!(user_id = %actor.id, "no organization; empty audit log");
            return Ok(Vec::new());
        };

        let scope = accessible_organizations(self.organizations.as_ref(), home).await?;
        Ok(self
            .log
            .list_for_organizations(&scope, AUDIT_PAGE_SIZE)
            .await?)
    }
}
