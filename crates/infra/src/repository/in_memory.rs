use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use taskhub_core::{Entity, OrganizationId, TaskId, UserId};
use taskhub_domain::{AuditEntry, AuditRecord, Organization, Task, User};

use super::{
    AuditLogRepository, OrganizationRepository, StoreError, StoreResult, TaskRepository,
    TaskWithOrganization, UserRepository,
};

/// Id-keyed table of entities.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: Eq + Hash,
{
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<E::Id, E>>> {
        self.rows
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<E::Id, E>>> {
        self.rows
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn get(&self, id: &E::Id) -> StoreResult<Option<E>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn filter(&self, mut keep: impl FnMut(&E) -> bool) -> StoreResult<Vec<E>> {
        Ok(self.read()?.values().filter(|e| keep(e)).cloned().collect())
    }

    fn put(&self, row: E) -> StoreResult<()> {
        self.write()?.insert(*row.id(), row);
        Ok(())
    }

    fn remove(&self, id: &E::Id) -> StoreResult<()> {
        self.write()?.remove(id);
        Ok(())
    }
}

/// In-memory storage for tests/dev.
///
/// Implements every repository trait. Counts repository calls so tests can
/// assert that a code path never touched storage.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    organizations: Table<Organization>,
    users: Table<User>,
    tasks: Table<Task>,
    audit: RwLock<Vec<AuditEntry>>,
    operations: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls served so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Snapshot of the audit log in insertion order.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.read().map(|log| log.clone()).unwrap_or_default()
    }

    fn tick(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn get(&self, id: OrganizationId) -> StoreResult<Option<Organization>> {
        self.tick();
        self.organizations.get(&id)
    }

    async fn children_of(&self, parent: OrganizationId) -> StoreResult<Vec<Organization>> {
        self.tick();
        let mut children = self
            .organizations
            .filter(|o| o.parent_id == Some(parent))?;
        children.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(children)
    }

    async fn list_all(&self) -> StoreResult<Vec<Organization>> {
        self.tick();
        let mut all = self.organizations.filter(|_| true)?;
        all.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(all)
    }

    async fn insert(&self, organization: &Organization) -> StoreResult<()> {
        self.tick();
        self.organizations.put(organization.clone())
    }

    async fn delete(&self, id: OrganizationId) -> StoreResult<()> {
        self.tick();
        self.organizations.remove(&id)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        self.tick();
        self.users.get(&id)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.tick();
        Ok(self.users.filter(|u| u.email == email)?.into_iter().next())
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.tick();
        let mut rows = self.users.write()?;
        if rows.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("user email".to_string()));
        }
        rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_organization(
        &self,
        id: UserId,
        organization_id: Option<OrganizationId>,
    ) -> StoreResult<()> {
        self.tick();
        let mut rows = self.users.write()?;
        let user = rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(format!("user {id} does not exist")))?;
        user.organization_id = organization_id;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> StoreResult<Vec<User>> {
        self.tick();
        self.users
            .filter(|u| u.organization_id == Some(organization_id))
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn get(&self, id: TaskId) -> StoreResult<Option<TaskWithOrganization>> {
        self.tick();
        let Some(task) = self.tasks.get(&id)? else {
            return Ok(None);
        };
        let organization = self.organizations.get(&task.organization_id)?.ok_or_else(|| {
            StoreError::Corrupt(format!("task {id} references a missing organization"))
        })?;
        Ok(Some(TaskWithOrganization { task, organization }))
    }

    async fn list_in_organizations(
        &self,
        organizations: &[OrganizationId],
    ) -> StoreResult<Vec<Task>> {
        self.tick();
        let mut tasks = self
            .tasks
            .filter(|t| organizations.contains(&t.organization_id))?;
        tasks.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(tasks)
    }

    async fn insert(&self, task: &Task) -> StoreResult<()> {
        self.tick();
        self.tasks.put(task.clone())
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        self.tick();
        let mut rows = self.tasks.write()?;
        match rows.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("task {} does not exist", task.id))),
        }
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        self.tick();
        self.tasks.remove(&id)
    }

    async fn count_in_organization(&self, organization_id: OrganizationId) -> StoreResult<usize> {
        self.tick();
        Ok(self
            .tasks
            .filter(|t| t.organization_id == organization_id)?
            .len())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        self.tick();
        self.audit
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }

    async fn list_for_organizations(
        &self,
        organizations: &[OrganizationId],
        limit: usize,
    ) -> StoreResult<Vec<AuditRecord>> {
        self.tick();
        let log = self
            .audit
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        // Reverse insertion order first so equal timestamps stay newest-first.
        let mut entries: Vec<AuditEntry> = log
            .iter()
            .rev()
            .filter(|e| e.organization_id.is_some_and(|o| organizations.contains(&o)))
            .cloned()
            .collect();
        drop(log);
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);

        let users = self.users.read()?;
        Ok(entries
            .into_iter()
            .map(|entry| {
                let user_email = entry
                    .user_id
                    .and_then(|id| users.get(&id))
                    .map(|u| u.email.clone());
                AuditRecord { entry, user_email }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use taskhub_auth::Role;
    use taskhub_domain::{AuditEvent, NewTask};

    use super::*;

    fn org(name: &str, parent: Option<OrganizationId>) -> Organization {
        Organization::new(name, parent, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        let a = User::new("a@example.com", "h", Role::Viewer, None, Utc::now());
        let b = User::new("a@example.com", "h", Role::Owner, None, Utc::now());
        UserRepository::insert(&store, &a).await.unwrap();
        let err = UserRepository::insert(&store, &b).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = InMemoryStore::new();
        let a = User::new("a@example.com", "h", Role::Viewer, None, Utc::now());
        UserRepository::insert(&store, &a).await.unwrap();
        assert!(store.find_by_email("A@example.com").await.unwrap().is_none());
        assert!(store.find_by_email("a@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tasks_list_newest_first_within_scope() {
        let store = InMemoryStore::new();
        let root = org("R", None);
        let other = org("O", None);
        OrganizationRepository::insert(&store, &root).await.unwrap();
        OrganizationRepository::insert(&store, &other).await.unwrap();

        let creator = UserId::new();
        let base = Utc::now();
        for (i, org_id) in [root.id, root.id, other.id].into_iter().enumerate() {
            let input = NewTask {
                title: format!("t{i}"),
                ..Default::default()
            };
            let task = Task::create(input, org_id, creator, base + Duration::seconds(i as i64))
                .unwrap();
            TaskRepository::insert(&store, &task).await.unwrap();
        }

        let listed = store.list_in_organizations(&[root.id]).await.unwrap();
        let titles: Vec<_> = listed.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t0"]);
    }

    #[tokio::test]
    async fn task_lookup_joins_owning_organization() {
        let store = InMemoryStore::new();
        let root = org("R", None);
        let child = org("C", Some(root.id));
        OrganizationRepository::insert(&store, &root).await.unwrap();
        OrganizationRepository::insert(&store, &child).await.unwrap();
        let input = NewTask {
            title: "x".to_string(),
            ..Default::default()
        };
        let task = Task::create(input, child.id, UserId::new(), Utc::now()).unwrap();
        TaskRepository::insert(&store, &task).await.unwrap();

        let found = TaskRepository::get(&store, task.id).await.unwrap().unwrap();
        assert_eq!(found.organization.parent_id, Some(root.id));
    }

    #[tokio::test]
    async fn audit_query_is_scoped_capped_and_joined() {
        let store = InMemoryStore::new();
        let user = User::new("a@example.com", "h", Role::Owner, None, Utc::now());
        UserRepository::insert(&store, &user).await.unwrap();
        let mine = OrganizationId::new();
        let theirs = OrganizationId::new();
        let base = Utc::now();
        for i in 0..3 {
            let entry = AuditEvent::new("task:create", "task")
                .by(user.id)
                .in_organization(Some(mine))
                .resource_id(i)
                .into_entry(base + Duration::seconds(i));
            store.append(&entry).await.unwrap();
        }
        let foreign = AuditEvent::new("task:create", "task")
            .in_organization(Some(theirs))
            .into_entry(base);
        store.append(&foreign).await.unwrap();

        let records = store.list_for_organizations(&[mine], 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entry.resource_id, "2");
        assert_eq!(records[1].entry.resource_id, "1");
        assert_eq!(records[0].user_email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn operations_are_counted() {
        let store = InMemoryStore::new();
        assert_eq!(store.operations(), 0);
        let _ = OrganizationRepository::get(&store, OrganizationId::new()).await;
        let _ = store.children_of(OrganizationId::new()).await;
        assert_eq!(store.operations(), 2);
    }
}
