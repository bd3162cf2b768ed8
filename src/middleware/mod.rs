//! Resource-resolution and authorization middleware for the project routes.
//!
//! The chain under `/api/projects/{project_id}` runs, in order:
//! `AuthMiddleware` → `project_exists` → `project_access` → (`task_exists` →
//! `task_belongs_to_project`) → (`manager_only`) → handler.
//! Each step stores what it resolved in the request extensions; handlers read it back
//! through the `CurrentProject` / `CurrentTask` extractors.

pub mod project;
pub mod task;

use actix_web::{dev::ServiceRequest, web, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

pub use project::{manager_only, project_access, project_exists, CurrentProject};
pub use task::{task_belongs_to_project, task_exists, CurrentTask};

pub(crate) fn app_state(req: &ServiceRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError("Application state missing".into()))
}

/// Parses the `{name}` path segment as an id.
pub(crate) fn path_id(req: &ServiceRequest, name: &str) -> Result<Uuid, AppError> {
    req.match_info()
        .get(name)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid ID".into()))
}

/// Clones a value an earlier middleware stored in the request extensions.
pub(crate) fn resolved<T: Clone + 'static>(req: &ServiceRequest, what: &str) -> Result<T, AppError> {
    req.extensions()
        .get::<T>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError(format!("{} not resolved for this route", what)))
}

pub(crate) fn requester(req: &ServiceRequest) -> Result<User, AppError> {
    req.extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))
}

pub(crate) fn extract<T: Clone + 'static>(req: &HttpRequest, what: &str) -> Result<T, AppError> {
    req.extensions()
        .get::<T>()
        .cloned()
        .ok_or_else(|| AppError::InternalServerError(format!("{} not resolved for this route", what)))
}
