use actix_web::{
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    Error as ActixError, FromRequest, HttpMessage, HttpRequest,
};
use std::future::{ready, Ready};
use std::ops::Deref;

use super::{app_state, extract, path_id, resolved};
use crate::error::AppError;
use crate::models::{Project, Task};

/// Loads the task named by `{task_id}` and stores it in the request extensions.
pub async fn task_exists(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, ActixError> {
    let state = app_state(&req)?;
    let task_id = path_id(&req, "task_id")?;

    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    req.extensions_mut().insert(task);
    next.call(req).await
}

/// Rejects a task addressed through a project it does not belong to.
pub async fn task_belongs_to_project(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, ActixError> {
    let project: Project = resolved(&req, "Project")?;
    let task: Task = resolved(&req, "Task")?;

    if !task.belongs_to(project.id) {
        return Err(AppError::InvalidAction("Invalid action".into()).into());
    }

    next.call(req).await
}

/// The task resolved by `task_exists`.
#[derive(Debug, Clone)]
pub struct CurrentTask(pub Task);

impl CurrentTask {
    pub fn into_inner(self) -> Task {
        self.0
    }
}

impl Deref for CurrentTask {
    type Target = Task;

    fn deref(&self) -> &Task {
        &self.0
    }
}

impl FromRequest for CurrentTask {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            extract::<Task>(req, "Task")
                .map(CurrentTask)
                .map_err(Into::into),
        )
    }
}
