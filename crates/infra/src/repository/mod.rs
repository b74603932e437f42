//! Storage contracts for the authorization core.
//!
//! Every trait is object-safe so services can hold `Arc<dyn ...>` handles and
//! tests can swap individual repositories (for example a failing audit log).
//!
//! The audit log is append-only: its contract has no update or delete.

use async_trait::async_trait;
use thiserror::Error;

use taskhub_core::{DomainError, OrganizationId, TaskId, UserId};
use taskhub_domain::{AuditEntry, AuditRecord, Organization, Task, User};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    /// A uniqueness constraint was violated.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A stored row could not be mapped back into a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => DomainError::Conflict(format!("{what} already exists")),
            other => DomainError::Storage(other.to_string()),
        }
    }
}

/// A task together with the organization that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWithOrganization {
    pub task: Task,
    pub organization: Organization,
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn get(&self, id: OrganizationId) -> StoreResult<Option<Organization>>;

    /// Direct children, oldest first (ties by id).
    async fn children_of(&self, parent: OrganizationId) -> StoreResult<Vec<Organization>>;

    /// Every organization, sorted by name.
    async fn list_all(&self) -> StoreResult<Vec<Organization>>;

    async fn insert(&self, organization: &Organization) -> StoreResult<()>;

    async fn delete(&self, id: OrganizationId) -> StoreResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Exact (case-sensitive) match.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Fails with `Duplicate` when the email is taken.
    async fn insert(&self, user: &User) -> StoreResult<()>;

    async fn set_organization(
        &self,
        id: UserId,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<()>;

    async fn list_by_organization(&self, organization_id: OrganizationId)
    -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get(&self, id: TaskId) -> StoreResult<Option<TaskWithOrganization>>;

    /// Tasks owned by any of `organizations`, newest first (ties by id descending).
    async fn list_in_organizations(
        &self,
        organizations: &[OrganizationId],
    ) -> StoreResult<Vec<Task>>;

    async fn insert(&self, task: &Task) -> StoreResult<()>;

    async fn update(&self, task: &Task) -> StoreResult<()>;

    async fn delete(&self, id: TaskId) -> StoreResult<()>;

    async fn count_in_organization(&self, organization_id: OrganizationId) -> StoreResult<usize>;
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()>;

    /// Entries scoped to `organizations`, newest first, at most `limit`,
    /// joined with the originating user's email.
    async fn list_for_organizations(
        &self,
        organizations: &[OrganizationId],
        limit: usize,
    ) -> StoreResult<Vec<AuditRecord>>;
}
