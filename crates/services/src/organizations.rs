use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use taskhub_auth::{
    authorize_organization_removal, ensure_removable, plan_organization_creation, require_owner,
    Actor, CreationPlan, OrgDependents, OrgNode, OrgPolicyError, Role,
};
use taskhub_core::{DomainError, DomainResult, OrganizationId};
use taskhub_domain::audit::{actions, resources};
use taskhub_domain::{AuditEvent, Organization};
use taskhub_infra::{OrganizationRepository, TaskRepository, UserRepository};

use crate::AuditRecorder;

/// Organization administration under the two-level hierarchy rules.
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    audit: Arc<AuditRecorder>,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            organizations,
            users,
            tasks,
            audit,
        }
    }

    /// Create a root (actor has no organization) or a child of the actor's root.
    ///
    /// Creating a root also makes it the actor's organization.
    pub async fn create(
        &self,
        name: &str,
        parent_id: Option<OrganizationId>,
        actor: &Actor,
    ) -> DomainResult<Organization> {
        require_owner(actor.role, "create")?;

        let home = match actor.organization_id() {
            Some(id) => Some(self.fetch(id, "organization").await?.node()),
            None => None,
        };
        let requested_parent = match (home, parent_id) {
            (_, None) => None,
            // Without a home organization any parent is refused; its position is irrelevant.
            (None, Some(id)) => Some(OrgNode::root(id)),
            (Some(home), Some(id)) if home.id == id => Some(home),
            (Some(_), Some(id)) => Some(self.fetch(id, "parent organization").await?.node()),
        };

        let plan = plan_organization_creation(actor.role, home, requested_parent)?;
        let parent = match plan {
            CreationPlan::Root => None,
            CreationPlan::Child { parent } => Some(parent),
        };

        let organization = Organization::new(name, parent, Utc::now())?;
        self.organizations.insert(&organization).await?;
        if plan == CreationPlan::Root {
            self.users
                .set_organization(actor.id, Some(organization.id))
                .await?;
        }
        info!(
            organization_id = %organization.id,
            root = organization.is_root(),
            "organization created"
        );

        let (scope, details) = match parent {
            None => (organization.id, json!({ "name": organization.name })),
            Some(parent) => (
                parent,
                json!({ "name": organization.name, "parent_id": parent }),
            ),
        };
        self.audit
            .record(
                AuditEvent::new(actions::ORGANIZATION_CREATE, resources::ORGANIZATION)
                    .by(actor.id)
                    .in_organization(Some(scope))
                    .resource_id(organization.id)
                    .details(details),
            )
            .await?;
        Ok(organization)
    }

    /// Root owners see their root plus its children; everyone else sees only
    /// their own organization.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<Organization>> {
        let Some(home_id) = actor.organization_id() else {
            debug!(user_id = %actor.id, "no organization; empty organization list");
            return Ok(Vec::new());
        };
        let Some(home) = self.organizations.get(home_id).await? else {
            return Ok(Vec::new());
        };

        if actor.role == Role::Owner && home.is_root() {
            let children = self.organizations.children_of(home.id).await?;
            let mut all = Vec::with_capacity(children.len() + 1);
            all.push(home);
            all.extend(children);
            return Ok(all);
        }
        Ok(vec![home])
    }

    /// Remove the actor's own organization or one of its direct children.
    ///
    /// The target must hold no users other than the actor, no child
    /// organizations and no tasks.
    pub async fn remove(&self, id: OrganizationId, actor: &Actor) -> DomainResult<()> {
        require_owner(actor.role, "delete")?;
        let home = actor
            .organization_id()
            .ok_or(OrgPolicyError::NoOrganization)?;

        let target = self.fetch(id, "organization").await?;
        let plan = authorize_organization_removal(actor.role, Some(home), target.node())?;

        let users = self
            .users
            .list_by_organization(target.id)
            .await?
            .into_iter()
            .filter(|u| u.id != actor.id)
            .count();
        let children = self.organizations.children_of(target.id).await?.len();
        let tasks = self.tasks.count_in_organization(target.id).await?;
        ensure_removable(OrgDependents {
            users,
            children,
            tasks,
        })?;

        if plan.clears_actor_membership {
            self.users.set_organization(actor.id, None).await?;
        }
        self.organizations.delete(target.id).await?;
        info!(organization_id = %target.id, "organization deleted");

        self.audit
            .record(
                AuditEvent::new(actions::ORGANIZATION_DELETE, resources::ORGANIZATION)
                    .by(actor.id)
                    .in_organization(Some(home))
                    .resource_id(target.id)
                    .details(json!({ "name": target.name })),
            )
            .await?;
        Ok(())
    }

    async fn fetch(&self, id: OrganizationId, what: &str) -> DomainResult<Organization> {
        self.organizations
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{what} {id}")))
    }
}
