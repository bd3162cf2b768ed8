use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Any stage may follow any other; transitions only happen through the status endpoint.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Pending,
    /// Task is blocked or paused.
    OnHold,
    /// Task is currently being worked on.
    InProgress,
    /// Task is finished and awaiting review.
    UnderReview,
    /// Task is completed.
    Completed,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200, message = "Task name is required"))]
    pub name: String,

    /// Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000, message = "Description is required"))]
    pub description: String,
}

/// Body of the status update endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusInput {
    pub status: TaskStatus,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// The project this task belongs to.
    pub project: Uuid,
    pub status: TaskStatus,
    /// User who made the last status change, `None` while pending.
    pub completed_by: Option<Uuid>,
    /// Notes attached to the task, in creation order.
    pub notes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task inside `project`.
    pub fn new(input: TaskInput, project: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            project,
            status: TaskStatus::default(),
            completed_by: None,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: TaskInput) {
        self.name = input.name;
        self.description = input.description;
        self.updated_at = Utc::now();
    }

    /// Moves the task to `status` on behalf of `user_id`.
    pub fn set_status(&mut self, status: TaskStatus, user_id: Uuid) {
        self.status = status;
        self.completed_by = match status {
            TaskStatus::Pending => None,
            _ => Some(user_id),
        };
        self.updated_at = Utc::now();
    }

    pub fn belongs_to(&self, project_id: Uuid) -> bool {
        self.project == project_id
    }
}
