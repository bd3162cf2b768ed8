use crate::{
    error::AppError,
    middleware::{manager_only, CurrentProject},
    models::PublicUser,
    state::AppState,
};
use actix_web::{delete, get, middleware::from_fn, post, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct FindMemberRequest {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MemberPath {
    pub user_id: Uuid,
}

/// Looks up a registered user by email so they can be added to the team.
#[post("/team/find")]
pub async fn find_member_by_email(
    state: web::Data<AppState>,
    body: web::Json<FindMemberRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

/// Lists the project's team members.
#[get("/team")]
pub async fn get_project_team(
    state: web::Data<AppState>,
    current: CurrentProject,
) -> Result<impl Responder, AppError> {
    let members: Vec<PublicUser> = state
        .store
        .find_users_by_ids(&current.team)
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();

    Ok(HttpResponse::Ok().json(members))
}

/// Adds a user to the team. Manager only.
///
/// ## Responses:
/// - `200 OK`: The user was added.
/// - `404 Not Found`: No user has that id.
/// - `409 Conflict`: The user is already a member.
#[post("/team", wrap = "from_fn(manager_only)")]
pub async fn add_member_by_id(
    state: web::Data<AppState>,
    current: CurrentProject,
    body: web::Json<AddMemberRequest>,
) -> Result<impl Responder, AppError> {
    let user = state
        .store
        .find_user_by_id(body.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if current.is_member(user.id) {
        return Err(AppError::Conflict(
            "The user is already a member of the project".into(),
        ));
    }
    if current.is_manager(user.id) {
        return Err(AppError::Conflict("The manager already has access".into()));
    }

    state.store.add_team_member(current.id, user.id).await?;

    log::info!("user {} added to project {}", user.id, current.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "User added successfully" })))
}

/// Removes a user from the team. Manager only.
///
/// Fails with `409 Conflict` when the user is not a member.
#[delete("/team/{user_id}", wrap = "from_fn(manager_only)")]
pub async fn remove_member_by_id(
    state: web::Data<AppState>,
    current: CurrentProject,
    path: web::Path<MemberPath>,
) -> Result<impl Responder, AppError> {
    if !current.is_member(path.user_id) {
        return Err(AppError::Conflict(
            "The user is not a member of the project".into(),
        ));
    }

    state.store.remove_team_member(current.id, path.user_id).await?;

    log::info!("user {} removed from project {}", path.user_id, current.id);
    Ok(HttpResponse::Ok().json(json!({ "message": "User removed successfully" })))
}
