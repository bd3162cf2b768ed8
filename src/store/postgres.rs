use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    NoteRepository, ProjectRepository, StoreResult, TaskRepository, TokenRepository,
    UserRepository,
};
use crate::models::{Note, Project, Task, Token, User};

const USER_COLUMNS: &str = "id, name, email, password, confirmed, created_at, updated_at";
const PROJECT_COLUMNS: &str =
    "id, project_name, client_name, description, manager, team, tasks, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, name, description, project, status, completed_by, notes, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, content, created_by, task, created_at";

/// PostgreSQL-backed store.
///
/// Tasks and notes are removed with their parent through `ON DELETE CASCADE` foreign keys.
/// The `UUID[]` columns are only written whole on insert; afterwards they change through
/// `array_append`/`array_remove` so concurrent requests cannot drop each other's entries.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY array_position($1, id)",
            USER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password, confirmed, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                password = EXCLUDED.password,
                confirmed = EXCLUDED.confirmed,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.confirmed)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT id, token, user_id, created_at FROM tokens
             WHERE token = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    async fn save_token(&self, token: &Token) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO tokens (id, token, user_id, created_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_token(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_tokens_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("DELETE FROM tokens WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn find_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM projects WHERE manager = $1 OR $1 = ANY(team) ORDER BY created_at",
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn save_project(&self, project: &Project) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO projects
                (id, project_name, client_name, description, manager, team, tasks, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                project_name = EXCLUDED.project_name,
                client_name = EXCLUDED.client_name,
                description = EXCLUDED.description,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(project.id)
        .bind(&project.project_name)
        .bind(&project.client_name)
        .bind(&project.description)
        .bind(project.manager)
        .bind(&project.team)
        .bind(&project.tasks)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE projects SET tasks = array_append(tasks, $2), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(project_id)
        .bind(task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE projects SET tasks = array_remove(tasks, $2), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(project_id)
        .bind(task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE projects SET team = array_append(team, $2), updated_at = NOW()
             WHERE id = $1 AND NOT ($2 = ANY(team))",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE projects SET team = array_remove(team, $2), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn find_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE project = $1 ORDER BY created_at",
            TASK_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO tasks
                (id, name, description, project, status, completed_by, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                completed_by = EXCLUDED.completed_by,
                updated_at = EXCLUDED.updated_at",
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.project)
        .bind(task.status)
        .bind(task.completed_by)
        .bind(&task.notes)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tasks SET notes = array_append(notes, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .bind(note_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            "UPDATE tasks SET notes = array_remove(notes, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .bind(note_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for PgStore {
    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {} FROM notes WHERE id = $1",
            NOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn find_notes_by_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {} FROM notes WHERE task = $1 ORDER BY created_at",
            NOTE_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn save_note(&self, note: &Note) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO notes (id, content, created_by, task, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET content = EXCLUDED.content",
        )
        .bind(note.id)
        .bind(&note.content)
        .bind(note.created_by)
        .bind(note.task)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
