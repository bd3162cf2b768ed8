use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NoteRepository, ProjectRepository, StoreResult, TaskRepository, TokenRepository,
    UserRepository,
};
use crate::error::AppError;
use crate::models::{Note, Project, Task, Token, User};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    tokens: HashMap<Uuid, Token>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    notes: HashMap<Uuid, Note>,
}

/// In-process store. Data lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `change` to the stored project, if any, under one write lock.
    async fn update_project(
        &self,
        project_id: Uuid,
        change: impl FnOnce(&mut Project) + Send,
    ) -> StoreResult<()> {
        if let Some(project) = self.inner.write().await.projects.get_mut(&project_id) {
            change(project);
            project.updated_at = Utc::now();
        }
        Ok(())
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.users.get(id).cloned()).collect())
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let email_taken = inner
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id);
        if email_taken {
            return Err(AppError::Conflict("Record already exists".into()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_token(&self, token: &str) -> StoreResult<Option<Token>> {
        let inner = self.inner.read().await;
        Ok(inner.tokens.values().find(|t| t.token == token).cloned())
    }

    async fn save_token(&self, token: &Token) -> StoreResult<()> {
        self.inner.write().await.tokens.insert(token.id, token.clone());
        Ok(())
    }

    async fn delete_token(&self, id: Uuid) -> StoreResult<()> {
        self.inner.write().await.tokens.remove(&id);
        Ok(())
    }

    async fn delete_tokens_for_user(&self, user_id: Uuid) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .tokens
            .retain(|_, t| t.user_id != user_id);
        Ok(())
    }

    async fn delete_tokens_created_before(&self, cutoff: DateTime<Utc>) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .tokens
            .retain(|_, t| t.created_at >= cutoff);
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn find_projects_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let inner = self.inner.read().await;
        let projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.can_access(user_id))
            .cloned()
            .collect();
        Ok(sorted_by(projects, |p| p.created_at))
    }

    async fn save_project(&self, project: &Project) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner.projects.get_mut(&project.id) {
            Some(stored) => {
                stored.project_name = project.project_name.clone();
                stored.client_name = project.client_name.clone();
                stored.description = project.description.clone();
                stored.updated_at = project.updated_at;
            }
            None => {
                inner.projects.insert(project.id, project.clone());
            }
        }
        Ok(())
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.projects.remove(&id);
        let task_ids: Vec<Uuid> = inner
            .tasks
            .values()
            .filter(|t| t.project == id)
            .map(|t| t.id)
            .collect();
        for task_id in &task_ids {
            inner.tasks.remove(task_id);
        }
        inner.notes.retain(|_, note| !task_ids.contains(&note.task));
        Ok(())
    }

    async fn add_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        self.update_project(project_id, |p| p.tasks.push(task_id))
            .await
    }

    async fn remove_project_task(&self, project_id: Uuid, task_id: Uuid) -> StoreResult<()> {
        self.update_project(project_id, |p| p.tasks.retain(|id| *id != task_id))
            .await
    }

    async fn add_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.update_project(project_id, |p| {
            if !p.team.contains(&user_id) {
                p.team.push(user_id);
            }
        })
        .await
    }

    async fn remove_team_member(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        self.update_project(project_id, |p| p.team.retain(|id| *id != user_id))
            .await
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.inner.read().await.tasks.get(&id).cloned())
    }

    async fn find_tasks_by_project(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let inner = self.inner.read().await;
        let tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.project == project_id)
            .cloned()
            .collect();
        Ok(sorted_by(tasks, |t| t.created_at))
    }

    async fn save_task(&self, task: &Task) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&task.id) {
            Some(stored) => {
                stored.name = task.name.clone();
                stored.description = task.description.clone();
                stored.status = task.status;
                stored.completed_by = task.completed_by;
                stored.updated_at = task.updated_at;
            }
            None => {
                inner.tasks.insert(task.id, task.clone());
            }
        }
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.tasks.remove(&id);
        inner.notes.retain(|_, note| note.task != id);
        Ok(())
    }

    async fn add_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()> {
        if let Some(task) = self.inner.write().await.tasks.get_mut(&task_id) {
            task.notes.push(note_id);
            task.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn remove_task_note(&self, task_id: Uuid, note_id: Uuid) -> StoreResult<()> {
        if let Some(task) = self.inner.write().await.tasks.get_mut(&task_id) {
            task.notes.retain(|id| *id != note_id);
            task.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn find_note(&self, id: Uuid) -> StoreResult<Option<Note>> {
        Ok(self.inner.read().await.notes.get(&id).cloned())
    }

    async fn find_notes_by_task(&self, task_id: Uuid) -> StoreResult<Vec<Note>> {
        let inner = self.inner.read().await;
        let notes: Vec<Note> = inner
            .notes
            .values()
            .filter(|n| n.task == task_id)
            .cloned()
            .collect();
        Ok(sorted_by(notes, |n| n.created_at))
    }

    async fn save_note(&self, note: &Note) -> StoreResult<()> {
        self.inner.write().await.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn delete_note(&self, id: Uuid) -> StoreResult<()> {
        self.inner.write().await.notes.remove(&id);
        Ok(())
    }
}
