use actix_web::{
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    Error as ActixError, FromRequest, HttpMessage, HttpRequest,
};
use std::future::{ready, Ready};
use std::ops::Deref;

use super::{app_state, extract, path_id, requester, resolved};
use crate::error::AppError;
use crate::models::Project;

/// Loads the project named by `{project_id}` and stores it in the request extensions.
pub async fn project_exists(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, ActixError> {
    let state = app_state(&req)?;
    let project_id = path_id(&req, "project_id")?;

    let project = state
        .store
        .find_project(project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    req.extensions_mut().insert(project);
    next.call(req).await
}

/// Lets the request through only for the project's manager and team members.
///
/// Anyone else gets the same 404 as for a project that does not exist.
pub async fn project_access(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, ActixError> {
    let user = requester(&req)?;
    let project: Project = resolved(&req, "Project")?;

    if !project.can_access(user.id) {
        log::warn!("user {} denied access to project {}", user.id, project.id);
        return Err(AppError::NotFound("Project not found".into()).into());
    }

    next.call(req).await
}

/// Restricts a route to the project's manager.
pub async fn manager_only(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, ActixError> {
    let user = requester(&req)?;
    let project: Project = resolved(&req, "Project")?;

    if !project.is_manager(user.id) {
        log::warn!(
            "user {} denied manager action on project {}",
            user.id,
            project.id
        );
        return Err(AppError::Forbidden("Only the manager can perform this action".into()).into());
    }

    next.call(req).await
}

/// The project resolved by `project_exists`.
#[derive(Debug, Clone)]
pub struct CurrentProject(pub Project);

impl CurrentProject {
    pub fn into_inner(self) -> Project {
        self.0
    }
}

impl Deref for CurrentProject {
    type Target = Project;

    fn deref(&self) -> &Project {
        &self.0
    }
}

impl FromRequest for CurrentProject {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            extract::<Project>(req, "Project")
                .map(CurrentProject)
                .map_err(Into::into),
        )
    }
}
