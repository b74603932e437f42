//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod repository;

pub use config::AppConfig;
pub use repository::{
    AuditLogRepository, InMemoryStore, OrganizationRepository, PostgresStore, StoreError,
    StoreResult, TaskRepository, TaskWithOrganization, UserRepository,
};
