//! Persistence behind repository traits.
//!
//! Handlers only see `dyn Store`. `PgStore` persists to PostgreSQL through sqlx and
//! `MemoryStore` keeps everything in process, for tests and local runs without a database.
//!
//! `save_*` operations are upserts keyed by id, mirroring how the handlers load an entity,
//! mutate it and write it back. On update they only touch scalar fields: the id lists
//! (`Project::team`, `Project::tasks`, `Task::notes`) change through their own single-element
//! operations, so two requests editing the same record never overwrite each other's list.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Note, Project, Task, Token, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Loads the given users, preserving the order of `ids` and skipping unknown ids.
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    /// Fails with `AppError::Conflict` when another user already owns the email.
    async fn save_user(&self, user: &User) -> StoreResult<()>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>>;

    async fn save_token(&self, token: &Token) -> StoreResult<()>;

    async fn delete_token(&self, id: Uuid) -> StoreResult<()>;

    /// Removes every token issued to the user.
    async fn delete_tokens_for_user(&self, user_id: Uuid) -> StoreResult<()>;

    /// Removes tokens created before `cutoff`.
    async fn delete_tokens_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<()>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Projects the user manages or is a team member of, oldest first.
    async fn find_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;

    async fn save_project(&self, project: &Project) -> StoreResult<()>;

    /// Deletes the project together with its tasks and their notes.
    async fn delete_project(&self, id: Uuid) -> StoreResult<()>;

    async fn add_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()>;

    async fn remove_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()>;

    /// Appends the user to the team unless already present.
    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Tasks of a project, oldest first.
    async fn find_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn save_task(&self, task: &Task) -> StoreResult<()>;

    /// Deletes the task together with its notes.
    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;

    async fn add_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()>;

    async fn remove_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>>;

    /// Notes of a task, oldest first.
    async fn find_notes_by_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>>;

    async fn save_note(&self, note: &Note) -> StoreResult<()>;

    async fn delete_note(&self, id: Uuid) -> StoreResult<()>;
}

/// Everything the handlers need from persistence.
pub trait Store:
    UserRepository + TokenRepository + ProjectRepository + TaskRepository + NoteRepository
{
}

impl<T> Store for T where
    T: UserRepository + TokenRepository + ProjectRepository + TaskRepository + NoteRepository
{
}

/// Settles two writes that were awaited together.
///
/// Neither write is rolled back when the other fails. Every failure is logged and the
/// first one is returned.
pub fn settle(results: (StoreResult<()>, StoreResult<()>)) -> StoreResult<()> {
    let (first, second) = results;
    if let Err(err) = &first {
        log::error!("first of paired writes failed: {}", err);
    }
    if let Err(err) = &second {
        log::error!("second of paired writes failed: {}", err);
    }
    first.and(second)
}
