use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    middleware::CurrentTask,
    models::{Note, NoteInput},
    state::AppState,
    store::settle,
};
use actix_web::{delete, get, post, web, HttpResponse, Responder};
use futures::future::join;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct NotePath {
    pub note_id: Uuid,
}

/// Adds a note to the current task, authored by the requester.
#[post("/notes")]
pub async fn create_note(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    current: CurrentTask,
    body: web::Json<NoteInput>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let note = Note::new(body.into_inner(), user.id, current.id);

    settle(
        join(
            state.store.save_note(&note),
            state.store.add_task_note(current.id, note.id),
        )
        .await,
    )?;

    Ok(HttpResponse::Created().json(note))
}

/// Lists the notes of the current task.
#[get("/notes")]
pub async fn get_task_notes(
    state: web::Data<AppState>,
    current: CurrentTask,
) -> Result<impl Responder, AppError> {
    let notes = state.store.find_notes_by_task(current.id).await?;
    Ok(HttpResponse::Ok().json(notes))
}

/// Deletes a note. Only its author may do this.
///
/// ## Responses:
/// - `200 OK`: The note was deleted.
/// - `403 Forbidden`: The requester did not write the note.
/// - `404 Not Found`: The note does not exist on this task.
#[delete("/notes/{note_id}")]
pub async fn delete_note(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    current: CurrentTask,
    path: web::Path<NotePath>,
) -> Result<impl Responder, AppError> {
    let note = state
        .store
        .find_note(path.note_id)
        .await?
        .filter(|note| note.task == current.id)
        .ok_or_else(|| AppError::NotFound("Note not found".into()))?;

    if note.created_by != user.id {
        return Err(AppError::Forbidden(
            "Only the author can delete the note".into(),
        ));
    }

    settle(
        join(
            state.store.delete_note(note.id),
            state.store.remove_task_note(current.id, note.id),
        )
        .await,
    )?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Note deleted successfully" })))
}
