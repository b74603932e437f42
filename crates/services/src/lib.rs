//! `taskhub-services`: orchestration of the authorization core.
//!
//! Each service method follows the same sequence: permission guard,
//! no-organization short-circuit, entity fetch, scope check, mutation, audit.
//! Every check is an explicit call in the method body.

pub mod audit;
pub mod auth;
pub mod organizations;
pub mod scope;
pub mod tasks;

use std::sync::Arc;

use chrono::Duration;

use taskhub_auth::{CredentialHasher, SessionTokens};
use taskhub_domain::{AuditPolicy, SignupPolicy};
use taskhub_infra::{AuditLogRepository, OrganizationRepository, TaskRepository, UserRepository};

pub use audit::AuditRecorder;
pub use auth::{AccessToken, AuthService, SignupRequest, SignupResult};
pub use organizations::OrganizationService;
pub use tasks::TaskService;

/// Storage handles shared by every service.
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub audit: Arc<dyn AuditLogRepository>,
}

impl Repositories {
    /// All four repositories backed by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: OrganizationRepository
            + UserRepository
            + TaskRepository
            + AuditLogRepository
            + 'static,
    {
        Self {
            organizations: store.clone(),
            users: store.clone(),
            tasks: store.clone(),
            audit: store,
        }
    }
}

/// Deployment choices the services depend on.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub signup_policy: SignupPolicy,
    pub audit_policy: AuditPolicy,
    pub token_ttl: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            signup_policy: SignupPolicy::default(),
            audit_policy: AuditPolicy::default(),
            token_ttl: Duration::days(7),
        }
    }
}

/// The full set of wired services.
#[derive(Clone)]
pub struct Services {
    pub audit: Arc<AuditRecorder>,
    pub tasks: Arc<TaskService>,
    pub organizations: Arc<OrganizationService>,
    pub auth: Arc<AuthService>,
}

impl Services {
    pub fn new(
        repos: Repositories,
        settings: ServiceSettings,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        let audit = Arc::new(AuditRecorder::new(
            repos.audit.clone(),
            repos.organizations.clone(),
            settings.audit_policy,
        ));
        let tasks = Arc::new(TaskService::new(
            repos.tasks.clone(),
            repos.organizations.clone(),
            audit.clone(),
        ));
        let organizations = Arc::new(OrganizationService::new(
            repos.organizations.clone(),
            repos.users.clone(),
            repos.tasks.clone(),
            audit.clone(),
        ));
        let auth = Arc::new(AuthService::new(
            repos.users,
            repos.organizations,
            audit.clone(),
            hasher,
            tokens,
            settings.signup_policy,
            settings.token_ttl,
        ));
        Self {
            audit,
            tasks,
            organizations,
            auth,
        }
    }
}
