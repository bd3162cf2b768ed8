pub mod auth;
pub mod health;
pub mod notes;
pub mod projects;
pub mod tasks;
pub mod team;

use actix_web::{middleware::from_fn, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::middleware::{project_access, project_exists, task_belongs_to_project, task_exists};

/// Registers every API route. Mounted under `/api` by the binary.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/auth")
            .service(auth::create_account)
            .service(auth::confirm_account)
            .service(auth::login)
            .service(auth::request_confirmation_code)
            .service(auth::forgot_password)
            .service(auth::validate_token)
            .service(auth::update_password_with_token)
            .service(auth::get_user)
            .service(auth::update_profile)
            .service(auth::update_current_user_password)
            .service(auth::check_password),
    )
    .service(
        web::scope("/projects")
            .wrap(AuthMiddleware)
            .service(projects::create_project)
            .service(projects::get_all_projects)
            .service(
                web::scope("/{project_id}")
                    .wrap(from_fn(project_access))
                    .wrap(from_fn(project_exists))
                    .service(projects::get_project_by_id)
                    .service(projects::update_project)
                    .service(projects::delete_project)
                    .service(team::find_member_by_email)
                    .service(team::get_project_team)
                    .service(team::add_member_by_id)
                    .service(team::remove_member_by_id)
                    .service(tasks::create_task)
                    .service(tasks::get_project_tasks)
                    .service(
                        web::scope("/tasks/{task_id}")
                            .wrap(from_fn(task_belongs_to_project))
                            .wrap(from_fn(task_exists))
                            .service(tasks::get_task_by_id)
                            .service(tasks::update_task)
                            .service(tasks::delete_task)
                            .service(tasks::update_status)
                            .service(notes::create_note)
                            .service(notes::get_task_notes)
                            .service(notes::delete_note),
                    ),
            ),
    );
}
