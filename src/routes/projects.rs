use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    middleware::CurrentProject,
    models::{Project, ProjectDetails, ProjectInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Creates a new project managed by the authenticated user.
///
/// ## Request Body:
/// `projectName`, `clientName` and `description`, all required.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Project`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation fails.
#[post("")]
pub async fn create_project(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let project = Project::new(body.into_inner(), user.id);
    state.store.save_project(&project).await?;

    log::info!("project {} created by user {}", project.id, user.id);
    Ok(HttpResponse::Created().json(project))
}

/// Lists the projects the authenticated user manages or is a team member of.
#[get("")]
pub async fn get_all_projects(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let projects = state.store.find_projects_for_user(user.id).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Retrieves a project with its tasks.
///
/// Reached only through `project_exists` and `project_access`, so users outside the
/// project already received a 404.
#[get("")]
pub async fn get_project_by_id(
    state: web::Data<AppState>,
    current: CurrentProject,
) -> Result<impl Responder, AppError> {
    let tasks = state.store.find_tasks_by_project(current.id).await?;
    Ok(HttpResponse::Ok().json(ProjectDetails::new(current.into_inner(), tasks)))
}

/// Updates a project's name, client and description. Manager only.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Project`.
/// - `404 Not Found`: The project does not exist or the requester is not its manager.
/// - `422 Unprocessable Entity`: If input validation fails.
#[put("")]
pub async fn update_project(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    current: CurrentProject,
    body: web::Json<ProjectInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if !current.is_manager(user.id) {
        return Err(AppError::NotFound(
            "Only the manager can update a project".into(),
        ));
    }

    let mut project = current.into_inner();
    project.apply(body.into_inner());
    state.store.save_project(&project).await?;

    Ok(HttpResponse::Ok().json(project))
}

/// Deletes a project together with its tasks and notes. Manager only.
#[delete("")]
pub async fn delete_project(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    current: CurrentProject,
) -> Result<impl Responder, AppError> {
    if !current.is_manager(user.id) {
        return Err(AppError::NotFound(
            "Only the manager can delete a project".into(),
        ));
    }

    state.store.delete_project(current.id).await?;

    log::info!("project {} deleted by user {}", current.id, user.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Project deleted successfully" })))
}
