use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    middleware::{manager_only, CurrentProject, CurrentTask},
    models::{StatusInput, Task, TaskInput},
    state::AppState,
    store::settle,
};
use actix_web::{delete, get, middleware::from_fn, post, put, web, HttpResponse, Responder};
use futures::future::join;
use serde_json::json;
use validator::Validate;

/// Creates a task in the current project. Manager only.
///
/// The task is saved and appended to the project's task list; both writes are awaited
/// even if one of them fails.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Task`.
/// - `403 Forbidden`: The requester is not the project's manager.
/// - `422 Unprocessable Entity`: If input validation fails.
#[post("/tasks", wrap = "from_fn(manager_only)")]
pub async fn create_task(
    state: web::Data<AppState>,
    current: CurrentProject,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let task = Task::new(body.into_inner(), current.id);

    settle(
        join(
            state.store.save_task(&task),
            state.store.add_project_task(current.id, task.id),
        )
        .await,
    )?;

    log::info!("task {} created in project {}", task.id, current.id);
    Ok(HttpResponse::Created().json(task))
}

/// Lists the tasks of the current project.
#[get("/tasks")]
pub async fn get_project_tasks(
    state: web::Data<AppState>,
    current: CurrentProject,
) -> Result<impl Responder, AppError> {
    let tasks = state.store.find_tasks_by_project(current.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a task. `task_exists` and `task_belongs_to_project` already ran.
#[get("")]
pub async fn get_task_by_id(current: CurrentTask) -> impl Responder {
    HttpResponse::Ok().json(current.into_inner())
}

/// Updates a task's name and description. Manager only.
#[put("", wrap = "from_fn(manager_only)")]
pub async fn update_task(
    state: web::Data<AppState>,
    current: CurrentTask,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let mut task = current.into_inner();
    task.apply(body.into_inner());
    state.store.save_task(&task).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and its notes, and drops it from the project's task list. Manager only.
#[delete("", wrap = "from_fn(manager_only)")]
pub async fn delete_task(
    state: web::Data<AppState>,
    project: CurrentProject,
    current: CurrentTask,
) -> Result<impl Responder, AppError> {
    settle(
        join(
            state.store.delete_task(current.id),
            state.store.remove_project_task(project.id, current.id),
        )
        .await,
    )?;

    log::info!("task {} deleted from project {}", current.id, project.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}

/// Moves a task to another status stage. Any project member may do this.
///
/// No transition rules apply; `completedBy` records who made the change.
#[post("/status")]
pub async fn update_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    current: CurrentTask,
    body: web::Json<StatusInput>,
) -> Result<impl Responder, AppError> {
    let mut task = current.into_inner();
    task.set_status(body.status, user.id);
    state.store.save_task(&task).await?;

    Ok(HttpResponse::Ok().json(task))
}
