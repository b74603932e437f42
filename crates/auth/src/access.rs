//! Access decisions over organization-scoped resources.
//!
//! Everything here is pure: callers fetch snapshots, these functions decide.
//! - No IO
//! - No panics

use thiserror::Error;

use taskhub_core::{DomainError, OrganizationId};

use crate::Role;

/// Can a user in `user_org` act on a task owned by `task_org`?
///
/// Same organization, or the user's organization is the task organization's
/// direct parent. Child-over-parent and sibling access are denied.
pub fn can_access_task_org(
    user_org: OrganizationId,
    task_org: OrganizationId,
    task_org_parent: Option<OrganizationId>,
) -> bool {
    user_org == task_org || task_org_parent == Some(user_org)
}

/// Organization-level access is same-organization only.
///
/// Parent-over-child administration rights are granted by the creation and
/// removal procedures below, not by this predicate.
pub fn can_access_organization(user_org: OrganizationId, target_org: OrganizationId) -> bool {
    user_org == target_org
}

/// Immutable snapshot of an organization's position in the hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrgNode {
    pub id: OrganizationId,
    pub parent_id: Option<OrganizationId>,
}

impl OrgNode {
    pub fn root(id: OrganizationId) -> Self {
        Self { id, parent_id: None }
    }

    pub fn child(id: OrganizationId, parent_id: OrganizationId) -> Self {
        Self {
            id,
            parent_id: Some(parent_id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Why an organization creation or removal was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrgPolicyError {
    #[error("only an owner can {0} organizations")]
    OwnerRequired(&'static str),

    #[error("no organization assigned")]
    NoOrganization,

    #[error("cannot set a parent when creating your first (root) organization")]
    RootWithParent,

    #[error("only the owner of a root organization may create sub-organizations")]
    NotRootOwner,

    #[error("parent must be your root organization")]
    ParentMismatch,

    #[error("organizations nest at most two levels deep")]
    DepthExceeded,

    #[error("you can only delete your own organization or its direct children")]
    OutsideHierarchy,

    #[error("cannot delete an organization that has users; reassign or remove them first")]
    HasUsers,

    #[error("cannot delete an organization that has sub-organizations")]
    HasChildren,

    #[error("cannot delete an organization that still owns tasks")]
    HasTasks,
}

impl From<OrgPolicyError> for DomainError {
    fn from(err: OrgPolicyError) -> Self {
        let msg = err.to_string();
        match err {
            OrgPolicyError::OwnerRequired(_)
            | OrgPolicyError::NoOrganization
            | OrgPolicyError::NotRootOwner
            | OrgPolicyError::OutsideHierarchy => DomainError::Forbidden(msg),
            OrgPolicyError::RootWithParent
            | OrgPolicyError::DepthExceeded
            | OrgPolicyError::HasChildren
            | OrgPolicyError::HasTasks => DomainError::Conflict(msg),
            OrgPolicyError::ParentMismatch | OrgPolicyError::HasUsers => {
                DomainError::BadRequest(msg)
            }
        }
    }
}

/// Outcome of a successful creation decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CreationPlan {
    /// A new root; the actor becomes a member of it.
    Root,
    /// A new child of the actor's (root) organization.
    Child { parent: OrganizationId },
}

pub fn require_owner(role: Role, action: &'static str) -> Result<(), OrgPolicyError> {
    if role == Role::Owner {
        Ok(())
    } else {
        Err(OrgPolicyError::OwnerRequired(action))
    }
}

/// Decide whether an actor may create an organization, and where it goes.
///
/// `home` is the actor's current organization (`None` when unaffiliated) and
/// `requested_parent` the resolved parent the caller asked for, if any.
pub fn plan_organization_creation(
    role: Role,
    home: Option<OrgNode>,
    requested_parent: Option<OrgNode>,
) -> Result<CreationPlan, OrgPolicyError> {
    require_owner(role, "create")?;

    let Some(home) = home else {
        return match requested_parent {
            Some(_) => Err(OrgPolicyError::RootWithParent),
            None => Ok(CreationPlan::Root),
        };
    };

    if !home.is_root() {
        return Err(OrgPolicyError::NotRootOwner);
    }

    if let Some(parent) = requested_parent {
        if parent.id != home.id {
            return Err(if parent.is_root() {
                OrgPolicyError::ParentMismatch
            } else {
                OrgPolicyError::DepthExceeded
            });
        }
    }

    Ok(CreationPlan::Child { parent: home.id })
}

/// Outcome of a successful removal decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RemovalPlan {
    /// The target is the actor's own organization; their membership is cleared.
    pub clears_actor_membership: bool,
}

/// Decide whether an actor may remove `target`, based on role and position.
pub fn authorize_organization_removal(
    role: Role,
    home: Option<OrganizationId>,
    target: OrgNode,
) -> Result<RemovalPlan, OrgPolicyError> {
    require_owner(role, "delete")?;
    let home = home.ok_or(OrgPolicyError::NoOrganization)?;

    let is_home = target.id == home;
    let is_child_of_home = target.parent_id == Some(home);
    if !is_home && !is_child_of_home {
        return Err(OrgPolicyError::OutsideHierarchy);
    }

    Ok(RemovalPlan {
        clears_actor_membership: is_home,
    })
}

/// What still hangs off an organization that is about to be removed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct OrgDependents {
    pub users: usize,
    pub children: usize,
    pub tasks: usize,
}

pub fn ensure_removable(dependents: OrgDependents) -> Result<(), OrgPolicyError> {
    if dependents.users > 0 {
        return Err(OrgPolicyError::HasUsers);
    }
    if dependents.children > 0 {
        return Err(OrgPolicyError::HasChildren);
    }
    if dependents.tasks > 0 {
        return Err(OrgPolicyError::HasTasks);
    }
    Ok(())
}
