use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use taskhub_auth::{
    can_access_task_org, require_organization, require_permission, Actor, AuthzError, Permission,
};
use taskhub_core::{DomainError, DomainResult, TaskId};
use taskhub_domain::audit::{actions, resources};
use taskhub_domain::{AuditEvent, NewTask, Task, TaskPatch};
use taskhub_infra::{OrganizationRepository, TaskRepository, TaskWithOrganization};

use crate::scope::accessible_organizations;
use crate::AuditRecorder;

/// Organization-scoped task CRUD.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    audit: Arc<AuditRecorder>,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            tasks,
            organizations,
            audit,
        }
    }

    /// Tasks in the actor's accessible organizations, newest first.
    pub async fn list(&self, actor: &Actor) -> DomainResult<Vec<Task>> {
        require_permission(actor, Permission::TaskRead)?;
        let Some(home) = actor.organization_id() else {
            debug!(user_id = %actor.id, "no organization; empty task list");
            return Ok(Vec::new());
        };

        let scope = accessible_organizations(self.organizations.as_ref(), home).await?;
        Ok(self.tasks.list_in_organizations(&scope).await?)
    }

    pub async fn get(&self, id: TaskId, actor: &Actor) -> DomainResult<Task> {
        require_permission(actor, Permission::TaskRead)?;
        Ok(self.load_accessible(id, actor).await?.task)
    }

    pub async fn create(&self, input: NewTask, actor: &Actor) -> DomainResult<Task> {
        require_permission(actor, Permission::TaskCreate)?;
        let home = require_organization(actor)?;

        let target = input.organization_id.unwrap_or(home);
        let scope = accessible_organizations(self.organizations.as_ref(), home).await?;
        if !scope.contains(&target) {
            return Err(AuthzError::OutOfScope.into());
        }

        let task = Task::create(input, target, actor.id, Utc::now())?;
        self.tasks.insert(&task).await?;
        info!(task_id = %task.id, organization_id = %task.organization_id, "task created");

        self.audit
            .record(
                AuditEvent::new(actions::TASK_CREATE, resources::TASK)
                    .by(actor.id)
                    .in_organization(Some(task.organization_id))
                    .resource_id(task.id)
                    .details(json!({ "title": task.title })),
            )
            .await?;
        Ok(task)
    }

    /// Apply the fields present in `patch`; absent fields are left untouched.
    pub async fn update(&self, id: TaskId, patch: TaskPatch, actor: &Actor) -> DomainResult<Task> {
        require_permission(actor, Permission::TaskUpdate)?;
        let TaskWithOrganization { mut task, .. } = self.load_accessible(id, actor).await?;

        task.apply_patch(patch, Utc::now())?;
        self.tasks.update(&task).await?;
        info!(task_id = %task.id, "task updated");

        self.audit
            .record(
                AuditEvent::new(actions::TASK_UPDATE, resources::TASK)
                    .by(actor.id)
                    .in_organization(Some(task.organization_id))
                    .resource_id(task.id)
                    .details(json!({ "title": task.title, "status": task.status })),
            )
            .await?;
        Ok(task)
    }

    /// The audit entry is written before the row is deleted.
    pub async fn remove(&self, id: TaskId, actor: &Actor) -> DomainResult<()> {
        require_permission(actor, Permission::TaskDelete)?;
        let TaskWithOrganization { task, .. } = self.load_accessible(id, actor).await?;

        self.audit
            .record(
                AuditEvent::new(actions::TASK_DELETE, resources::TASK)
                    .by(actor.id)
                    .in_organization(Some(task.organization_id))
                    .resource_id(task.id)
                    .details(json!({ "title": task.title })),
            )
            .await?;

        self.tasks.delete(task.id).await?;
        info!(task_id = %task.id, "task deleted");
        Ok(())
    }

    async fn load_accessible(&self, id: TaskId, actor: &Actor) -> DomainResult<TaskWithOrganization> {
        let home = require_organization(actor)?;
        let found = self
            .tasks
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("task {id}")))?;

        if !can_access_task_org(home, found.organization.id, found.organization.parent_id) {
            tracing::warn!(user_id = %actor.id, task_id = %id, "task outside organization scope");
            return Err(AuthzError::OutOfScope.into());
        }
        Ok(found)
    }
}
