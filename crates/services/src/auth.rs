//! Signup, login and session resolution.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use taskhub_auth::{CredentialHasher, Role, SessionClaims, SessionTokens};
use taskhub_core::{DomainError, DomainResult, OrganizationId};
use taskhub_domain::audit::{actions, resources};
use taskhub_domain::{AuditEvent, Organization, SignupPolicy, User, UserSummary};
use taskhub_infra::{OrganizationRepository, UserRepository};

use crate::AuditRecorder;

pub const MIN_PASSWORD_LEN: usize = 8;

const ADMIN_NEEDS_CHILD: &str =
    "admin must belong to a child organization; select a sub-organization instead";

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResult {
    pub access_token: String,
    pub user: UserSummary,
}

/// Surrounding whitespace is not part of an email; case is kept as typed.
pub fn normalize_email(email: &str) -> &str {
    email.trim()
}

enum Placement {
    Join(OrganizationId),
    Unaffiliated,
    CreateRoot,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    audit: Arc<AuditRecorder>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn SessionTokens>,
    policy: SignupPolicy,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        audit: Arc<AuditRecorder>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn SessionTokens>,
        policy: SignupPolicy,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            organizations,
            audit,
            hasher,
            tokens,
            policy,
            token_ttl,
        }
    }

    pub fn policy(&self) -> SignupPolicy {
        self.policy
    }

    /// Register a user and immediately log them in.
    pub async fn signup(&self, request: SignupRequest) -> DomainResult<SignupResult> {
        let email = normalize_email(&request.email).to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::bad_request("a valid email is required"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::bad_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("email already registered"));
        }

        let role = request.role.unwrap_or_default();
        let placement = self.place(role, request.organization_id).await?;
        let password_hash = self.hasher.hash(&request.password)?;
        let now = Utc::now();

        let created_root = match placement {
            Placement::CreateRoot => {
                let local = email.split('@').next().unwrap_or(&email);
                Some(Organization::new(&format!("{local}'s organization"), None, now)?)
            }
            _ => None,
        };
        let organization_id = match (&placement, &created_root) {
            (Placement::Join(id), _) => Some(*id),
            (_, Some(root)) => Some(root.id),
            _ => None,
        };

        let user = User::new(email, password_hash, role, organization_id, now);
        if let Some(root) = &created_root {
            self.organizations.insert(root).await?;
        }
        if let Err(err) = self.users.insert(&user).await {
            // A concurrent signup took the email; drop the root made for this one.
            if let Some(root) = &created_root {
                if let Err(cleanup) = self.organizations.delete(root.id).await {
                    warn!(
                        organization_id = %root.id,
                        error = %cleanup,
                        "orphaned signup organization"
                    );
                }
            }
            return Err(err.into());
        }
        info!(user_id = %user.id, role = %user.role, "user signed up");

        if let Some(root) = &created_root {
            self.audit
                .record(
                    AuditEvent::new(actions::ORGANIZATION_CREATE, resources::ORGANIZATION)
                        .by(user.id)
                        .in_organization(Some(root.id))
                        .resource_id(root.id)
                        .details(json!({ "name": root.name })),
                )
                .await?;
        }
        self.audit
            .record(
                AuditEvent::new(actions::USER_SIGNUP, resources::USER)
                    .by(user.id)
                    .in_organization(user.organization_id)
                    .resource_id(user.id)
                    .details(json!({ "email": user.email })),
            )
            .await?;

        let token = self.login(&user).await?;
        Ok(SignupResult {
            access_token: token.access_token,
            user: user.summary(),
        })
    }

    /// The user when the credentials match, `None` otherwise.
    pub async fn validate_user(&self, email: &str, password: &str) -> DomainResult<Option<User>> {
        let Some(user) = self.users.find_by_email(normalize_email(email)).await? else {
            debug!("login attempt for unknown email");
            return Ok(None);
        };
        if self.hasher.verify(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!(user_id = %user.id, "password mismatch");
            Ok(None)
        }
    }

    /// Record the login and issue a signed session token.
    pub async fn login(&self, user: &User) -> DomainResult<AccessToken> {
        self.audit
            .record(
                AuditEvent::new(actions::USER_LOGIN, resources::USER)
                    .by(user.id)
                    .in_organization(user.organization_id)
                    .resource_id(user.id)
                    .details(json!({ "email": user.email })),
            )
            .await?;

        let claims = SessionClaims::new(
            user.id,
            user.email.clone(),
            user.role,
            user.organization_id,
            Utc::now(),
            self.token_ttl,
        );
        Ok(AccessToken {
            access_token: self.tokens.issue(&claims)?,
        })
    }

    /// Resolve a bearer token to the current state of its user.
    ///
    /// The user is reloaded so organization changes since issuance apply.
    pub async fn authenticate(&self, token: &str) -> DomainResult<User> {
        let claims = self.tokens.verify(token, Utc::now())?;
        self.users
            .get(claims.sub)
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    /// Organizations offered at signup: everything for owners (or no role),
    /// only child organizations otherwise. Sorted by name.
    pub async fn organizations_for_signup(
        &self,
        role: Option<Role>,
    ) -> DomainResult<Vec<Organization>> {
        let all = self.organizations.list_all().await?;
        Ok(match role {
            Some(Role::Admin) | Some(Role::Viewer) => {
                all.into_iter().filter(|o| !o.is_root()).collect()
            }
            Some(Role::Owner) | None => all,
        })
    }

    async fn place(
        &self,
        role: Role,
        organization_id: Option<OrganizationId>,
    ) -> DomainResult<Placement> {
        let Some(id) = organization_id else {
            return match self.policy {
                SignupPolicy::RequireOrganization => {
                    Err(DomainError::bad_request("organization is required"))
                }
                SignupPolicy::OptionalOrganization => Ok(Placement::Unaffiliated),
                SignupPolicy::AutoCreateOrganization if role == Role::Admin => {
                    Err(DomainError::bad_request(ADMIN_NEEDS_CHILD))
                }
                SignupPolicy::AutoCreateOrganization => Ok(Placement::CreateRoot),
            };
        };

        let organization = self
            .organizations
            .get(id)
            .await?
            .ok_or_else(|| DomainError::bad_request("organization not found"))?;
        if role == Role::Admin && organization.is_root() {
            return Err(DomainError::bad_request(ADMIN_NEEDS_CHILD));
        }
        Ok(Placement::Join(organization.id))
    }
}
