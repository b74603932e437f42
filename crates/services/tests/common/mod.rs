#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use taskhub_auth::{Actor, CredentialError, CredentialHasher, Hs256Tokens, Role};
use taskhub_core::{OrganizationId, UserId};
use taskhub_domain::{AuditEntry, AuditPolicy, AuditRecord, Organization, SignupPolicy, User};
use taskhub_infra::{
    AuditLogRepository, InMemoryStore, OrganizationRepository, StoreError, StoreResult,
    UserRepository,
};
use taskhub_services::{Repositories, ServiceSettings, Services};

pub const JWT_SECRET: &[u8] = b"test-secret";

/// Reversible stand-in so tests don't pay for Argon2.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, CredentialError> {
        stored
            .strip_prefix("plain:")
            .map(|p| p == password)
            .ok_or_else(|| CredentialError::Malformed(stored.to_string()))
    }
}

/// Audit log whose writes always fail.
pub struct FailingAuditLog;

#[async_trait]
impl AuditLogRepository for FailingAuditLog {
    async fn append(&self, _entry: &AuditEntry) -> StoreResult<()> {
        Err(StoreError::Backend("audit table unavailable".to_string()))
    }

    async fn list_for_organizations(
        &self,
        _organizations: &[OrganizationId],
        _limit: usize,
    ) -> StoreResult<Vec<AuditRecord>> {
        Ok(Vec::new())
    }
}

/// User storage that loses every insert to a concurrent writer of the same email.
pub struct RacingUsers(pub Arc<InMemoryStore>);

#[async_trait]
impl UserRepository for RacingUsers {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        UserRepository::get(self.0.as_ref(), id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.0.find_by_email(email).await
    }

    async fn insert(&self, _user: &User) -> StoreResult<()> {
        Err(StoreError::Duplicate("email".to_string()))
    }

    async fn set_organization(
        &self,
        id: UserId,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<()> {
        self.0.set_organization(id, organization_id).await
    }

    async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> StoreResult<Vec<User>> {
        self.0.list_by_organization(organization_id).await
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_signup_policy(policy: SignupPolicy) -> Self {
        Self::with_settings(ServiceSettings {
            signup_policy: policy,
            ..ServiceSettings::default()
        })
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = Repositories::from_store(store.clone());
        Self::build(store, repos, settings)
    }

    /// Every repository backed by the store except the audit log, which fails.
    pub fn with_failing_audit(policy: AuditPolicy) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mut repos = Repositories::from_store(store.clone());
        repos.audit = Arc::new(FailingAuditLog);
        let settings = ServiceSettings {
            audit_policy: policy,
            ..ServiceSettings::default()
        };
        Self::build(store, repos, settings)
    }

    /// Every user insert fails as if another signup won the email.
    pub fn with_racing_signup(policy: SignupPolicy) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mut repos = Repositories::from_store(store.clone());
        repos.users = Arc::new(RacingUsers(store.clone()));
        let settings = ServiceSettings {
            signup_policy: policy,
            ..ServiceSettings::default()
        };
        Self::build(store, repos, settings)
    }

    fn build(store: Arc<InMemoryStore>, repos: Repositories, settings: ServiceSettings) -> Self {
        let services = Services::new(
            repos,
            settings,
            Arc::new(PlainHasher),
            Arc::new(Hs256Tokens::new(JWT_SECRET)),
        );
        Self { store, services }
    }

    pub async fn org(&self, name: &str, parent: Option<OrganizationId>) -> Organization {
        let org = Organization::new(name, parent, Utc::now()).unwrap();
        OrganizationRepository::insert(self.store.as_ref(), &org)
            .await
            .unwrap();
        org
    }

    pub async fn user(&self, email: &str, role: Role, org: Option<OrganizationId>) -> User {
        let user = User::new(email, "plain:password123", role, org, Utc::now());
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .unwrap();
        user
    }

    /// The actor as currently stored.
    pub async fn actor(&self, id: UserId) -> Actor {
        UserRepository::get(self.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap()
            .actor()
    }

    pub fn audit_actions(&self) -> Vec<String> {
        self.store
            .audit_entries()
            .into_iter()
            .map(|e| e.action)
            .collect()
    }
}
