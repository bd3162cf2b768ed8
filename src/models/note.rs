use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NoteInput {
    #[validate(length(min = 1, max = 2000, message = "Note content is required"))]
    pub content: String,
}

/// A comment left on a task by a project member.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub created_by: Uuid,
    pub task: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(input: NoteInput, created_by: Uuid, task: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: input.content,
            created_by,
            task,
            created_at: Utc::now(),
        }
    }
}
