//! Postgres-backed storage.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | Row decode / column type mismatch | N/A | `Corrupt` |
//! | Other (pool closed, network, ...) | N/A | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use taskhub_auth::Role;
use taskhub_core::{OrganizationId, TaskId, UserId};
use taskhub_domain::{AuditEntry, AuditRecord, Organization, Task, User};

use super::{
    AuditLogRepository, OrganizationRepository, StoreError, StoreResult, TaskRepository,
    TaskWithOrganization, UserRepository,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS organizations (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        parent_id UUID REFERENCES organizations(id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        organization_id UUID REFERENCES organizations(id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        title VARCHAR(500) NOT NULL,
        description TEXT,
        status TEXT NOT NULL,
        category TEXT NOT NULL,
        organization_id UUID NOT NULL REFERENCES organizations(id),
        created_by_id UUID NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS tasks_organization_idx ON tasks (organization_id, created_at DESC)",
    // No foreign keys: entries outlive the organizations and users they mention.
    r#"
    CREATE TABLE IF NOT EXISTS audit_logs (
        id UUID PRIMARY KEY,
        organization_id UUID,
        user_id UUID,
        action TEXT NOT NULL,
        resource TEXT NOT NULL,
        resource_id TEXT NOT NULL DEFAULT '',
        details JSONB,
        timestamp TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS audit_logs_organization_idx ON audit_logs (organization_id, timestamp DESC)",
];

/// Postgres-backed store implementing every repository trait.
///
/// Uses the SQLx connection pool (`Send + Sync`, cheap to clone).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for PostgresStore {
    async fn get(&self, id: OrganizationId) -> StoreResult<Option<Organization>> {
        let row = sqlx::query(
            "SELECT id, name, parent_id, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_organization", e))?;

        row.as_ref().map(organization_from_row).transpose()
    }

    async fn children_of(&self, parent: OrganizationId) -> StoreResult<Vec<Organization>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, parent_id, created_at, updated_at
            FROM organizations
            WHERE parent_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(parent.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("children_of", e))?;

        rows.iter().map(organization_from_row).collect()
    }

    async fn list_all(&self) -> StoreResult<Vec<Organization>> {
        let rows = sqlx::query(
            "SELECT id, name, parent_id, created_at, updated_at FROM organizations ORDER BY name ASC, id ASC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_organizations", e))?;

        rows.iter().map(organization_from_row).collect()
    }

    async fn insert(&self, organization: &Organization) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(&organization.name)
        .bind(organization.parent_id.map(Uuid::from))
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_organization", e))?;
        Ok(())
    }

    async fn delete(&self, id: OrganizationId) -> StoreResult<()> {
        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_organization", e))?;
        Ok(())
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, role, organization_id, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresStore {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.organization_id.map(Uuid::from))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_user", e) {
            StoreError::Duplicate(_) => StoreError::Duplicate("user email".to_string()),
            other => other,
        })?;
        Ok(())
    }

    async fn set_organization(
        &self,
        id: UserId,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE users SET organization_id = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(organization_id.map(Uuid::from))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_user_organization", e))?;
        Ok(())
    }

    async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE organization_id = $1 ORDER BY created_at ASC"
        ))
        .bind(organization_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users_by_organization", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.status, t.category, \
     t.organization_id, t.created_by_id, t.created_at, t.updated_at";

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn get(&self, id: TaskId) -> StoreResult<Option<TaskWithOrganization>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {TASK_COLUMNS},
                   o.name AS org_name, o.parent_id AS org_parent_id,
                   o.created_at AS org_created_at, o.updated_at AS org_updated_at
            FROM tasks t
            JOIN organizations o ON o.id = t.organization_id
            WHERE t.id = $1
            "#
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_task", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let task = task_from_row(&row)?;
        let organization = Organization {
            id: task.organization_id,
            name: column(&row, "org_name")?,
            parent_id: column::<Option<Uuid>>(&row, "org_parent_id")?.map(OrganizationId::from),
            created_at: column(&row, "org_created_at")?,
            updated_at: column(&row, "org_updated_at")?,
        };
        Ok(Some(TaskWithOrganization { task, organization }))
    }

    async fn list_in_organizations(
        &self,
        organizations: &[OrganizationId],
    ) -> StoreResult<Vec<Task>> {
        let ids: Vec<Uuid> = organizations.iter().copied().map(Uuid::from).collect();
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks t
            WHERE t.organization_id = ANY($1)
            ORDER BY t.created_at DESC, t.id DESC
            "#
        ))
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tasks", e))?;

        rows.iter().map(task_from_row).collect()
    }

    async fn insert(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, title, description, status, category,
                               organization_id, created_by_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.category.as_str())
        .bind(task.organization_id.as_uuid())
        .bind(task.created_by_id.as_uuid())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_task", e))?;
        Ok(())
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, category = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.category.as_str())
        .bind(task.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_task", e))?;
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_task", e))?;
        Ok(())
    }

    async fn count_in_organization(&self, organization_id: OrganizationId) -> StoreResult<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM tasks WHERE organization_id = $1")
            .bind(organization_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_tasks", e))?;
        let n: i64 = column(&row, "n")?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

#[async_trait]
impl AuditLogRepository for PostgresStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, organization_id, user_id, action, resource,
                                    resource_id, details, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.organization_id.map(Uuid::from))
        .bind(entry.user_id.map(Uuid::from))
        .bind(&entry.action)
        .bind(&entry.resource)
        .bind(&entry.resource_id)
        .bind(&entry.details)
        .bind(entry.timestamp)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_audit", e))?;
        Ok(())
    }

    async fn list_for_organizations(
        &self,
        organizations: &[OrganizationId],
        limit: usize,
    ) -> StoreResult<Vec<AuditRecord>> {
        let ids: Vec<Uuid> = organizations.iter().copied().map(Uuid::from).collect();
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.organization_id, a.user_id, a.action, a.resource,
                   a.resource_id, a.details, a.timestamp, u.email AS user_email
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.organization_id = ANY($1)
            ORDER BY a.timestamp DESC, a.id DESC
            LIMIT $2
            "#,
        )
        .bind(ids)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_audit", e))?;

        rows.iter()
            .map(|row| {
                let entry = AuditEntry {
                    id: column::<Uuid>(row, "id")?.into(),
                    organization_id: column::<Option<Uuid>>(row, "organization_id")?
                        .map(OrganizationId::from),
                    user_id: column::<Option<Uuid>>(row, "user_id")?.map(UserId::from),
                    action: column(row, "action")?,
                    resource: column(row, "resource")?,
                    resource_id: column(row, "resource_id")?,
                    details: column::<Option<JsonValue>>(row, "details")?,
                    timestamp: column::<DateTime<Utc>>(row, "timestamp")?,
                };
                Ok(AuditRecord {
                    entry,
                    user_email: column(row, "user_email")?,
                })
            })
            .collect()
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Corrupt(format!("column '{name}': {e}")))
}

fn organization_from_row(row: &PgRow) -> StoreResult<Organization> {
    Ok(Organization {
        id: column::<Uuid>(row, "id")?.into(),
        name: column(row, "name")?,
        parent_id: column::<Option<Uuid>>(row, "parent_id")?.map(OrganizationId::from),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = column(row, "role")?;
    Ok(User {
        id: column::<Uuid>(row, "id")?.into(),
        email: column(row, "email")?,
        password_hash: column(row, "password_hash")?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        organization_id: column::<Option<Uuid>>(row, "organization_id")?
            .map(OrganizationId::from),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn task_from_row(row: &PgRow) -> StoreResult<Task> {
    let status: String = column(row, "status")?;
    let category: String = column(row, "category")?;
    Ok(Task {
        id: column::<Uuid>(row, "id")?.into(),
        title: column(row, "title")?,
        description: column(row, "description")?,
        status: status
            .parse()
            .map_err(|e: taskhub_core::DomainError| StoreError::Corrupt(e.to_string()))?,
        category: category
            .parse()
            .map_err(|e: taskhub_core::DomainError| StoreError::Corrupt(e.to_string()))?,
        organization_id: column::<Uuid>(row, "organization_id")?.into(),
        created_by_id: column::<Uuid>(row, "created_by_id")?.into(),
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("decode error in {}: {}", operation, err))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
