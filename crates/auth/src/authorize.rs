use serde::Serialize;
use thiserror::Error;

use taskhub_core::{DomainError, OrganizationId, UserId};

use crate::{permissions_for, Actor, OrgMembership, Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("missing required permission: {0}")]
    MissingPermission(Permission),

    #[error("no organization assigned")]
    NoOrganization,

    #[error("resource is outside your organization scope")]
    OutOfScope,
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::Forbidden(err.to_string())
    }
}

/// Authorize an actor for a permission.
///
/// - No IO
/// - No panics
/// - No organization scoping (pure role check)
pub fn require_permission(actor: &Actor, required: Permission) -> Result<(), AuthzError> {
    if crate::has_permission(actor.role, required) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %actor.id,
            role = %actor.role,
            permission = %required,
            "permission denied"
        );
        Err(AuthzError::MissingPermission(required))
    }
}

/// The actor's organization, or `NoOrganization`.
pub fn require_organization(actor: &Actor) -> Result<OrganizationId, AuthzError> {
    actor.organization_id().ok_or(AuthzError::NoOrganization)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this request allowed or denied?" without performing it.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub principal: PrincipalState,
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub role: Role,
    pub membership: OrgMembership,
    pub effective_permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    UnknownPermission,
    MissingPermission,
}

/// Explain whether `actor` holds the permission named `required`.
///
/// Unknown permission names are denied rather than rejected, so callers can
/// probe freely.
pub fn explain_authorization(actor: &Actor, required: &str) -> AuthorizationExplanation {
    let effective = permissions_for(actor.role).to_vec();
    let principal = PrincipalState {
        user_id: actor.id,
        role: actor.role,
        membership: actor.membership,
        effective_permissions: effective.clone(),
    };

    let permission = match required.parse::<Permission>() {
        Ok(p) => p,
        Err(_) => {
            return AuthorizationExplanation {
                required_permission: required.to_string(),
                granted: false,
                reason: format!("'{required}' is not a known permission"),
                principal,
                denial_reason: Some(DenialReason {
                    kind: DenialKind::UnknownPermission,
                    message: format!("Unknown permission: '{required}'"),
                    suggestions: vec![format!(
                        "Use one of: {}",
                        Permission::ALL
                            .iter()
                            .map(|p| p.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )],
                }),
            };
        }
    };

    if effective.contains(&permission) {
        return AuthorizationExplanation {
            required_permission: permission.to_string(),
            granted: true,
            reason: format!("Role '{}' grants '{}'", actor.role, permission),
            principal,
            denial_reason: None,
        };
    }

    let granting_roles: Vec<&str> = Role::ALL
        .iter()
        .filter(|r| permissions_for(**r).contains(&permission))
        .map(|r| r.as_str())
        .collect();

    AuthorizationExplanation {
        required_permission: permission.to_string(),
        granted: false,
        reason: format!(
            "Role '{}' does not grant '{}'",
            actor.role, permission
        ),
        principal,
        denial_reason: Some(DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{permission}'"),
            suggestions: vec![format!(
                "Roles granting '{}': {}",
                permission,
                granting_roles.join(", ")
            )],
        }),
    }
}
