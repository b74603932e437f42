use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhub_core::{DomainError, DomainResult, Entity, OrganizationId, TaskId, UserId};

const MAX_TITLE_LEN: usize = 500;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Archived => "archived",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "archived" => Ok(TaskStatus::Archived),
            other => Err(DomainError::bad_request(format!("unknown task status '{other}'"))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    #[default]
    Work,
    Personal,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Work => "work",
            TaskCategory::Personal => "personal",
        }
    }
}

impl FromStr for TaskCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(TaskCategory::Work),
            "personal" => Ok(TaskCategory::Personal),
            other => Err(DomainError::bad_request(format!("unknown task category '{other}'"))),
        }
    }
}

/// A task owned by an organization.
///
/// The owning organization is not necessarily the creator's home organization,
/// but always one the creator could reach at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub organization_id: OrganizationId,
    pub created_by_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for task creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub category: Option<TaskCategory>,
    /// Target organization; the creator's home organization when absent.
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

/// Partial update. `None` fields are left untouched, never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub category: Option<TaskCategory>,
}

impl Task {
    pub fn create(
        input: NewTask,
        organization_id: OrganizationId,
        created_by_id: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id: TaskId::new(),
            title: validate_title(&input.title)?,
            description: input.description,
            status: input.status.unwrap_or_default(),
            category: input.category.unwrap_or_default(),
            organization_id,
            created_by_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(title) = patch.title {
            self.title = validate_title(&title)?;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_title(title: &str) -> DomainResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::bad_request("task title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::bad_request(format!(
            "task title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let input = NewTask {
            title: "Write report".to_string(),
            description: Some("Q3".to_string()),
            ..Default::default()
        };
        Task::create(input, OrganizationId::new(), UserId::new(), Utc::now()).unwrap()
    }

    #[test]
    fn defaults_to_open_work() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Open);
        assert_eq!(t.category, TaskCategory::Work);
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let mut t = task();
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        t.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(t.title, "Write report");
        assert_eq!(t.description.as_deref(), Some("Q3"));
        assert_eq!(t.status, TaskStatus::InProgress);
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut t = task();
        let patch = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(t.apply_patch(patch, Utc::now()).is_err());
        assert_eq!(t.title, "Write report");
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!("archived".parse::<TaskStatus>().unwrap(), TaskStatus::Archived);
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn patch_deserializes_from_sparse_json() {
        let patch: TaskPatch = serde_json::from_str(r#"{"category":"personal"}"#).unwrap();
        assert_eq!(patch.category, Some(TaskCategory::Personal));
        assert!(patch.title.is_none());
    }
}
