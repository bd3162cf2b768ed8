use crate::{
    auth::{
        generate_one_time_token, generate_token, hash_password, verify_password, AuthMiddleware,
        AuthResponse, AuthenticatedUser, CheckPasswordRequest, CreateAccountRequest, EmailRequest,
        LoginRequest, NewPasswordRequest, ResetTokenPath, TokenRequest, UpdatePasswordRequest,
        UpdateProfileRequest,
    },
    error::AppError,
    mail::{deliver, Recipient},
    models::{Token, User},
    state::AppState,
    store::settle,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use futures::future::join;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Attempts at drawing a code nobody else holds before giving up.
const MAX_TOKEN_DRAWS: usize = 10;

fn message(text: &str) -> serde_json::Value {
    json!({ "message": text })
}

/// Draws a new one-time token for `user_id`, superseding any the user still holds.
///
/// Expired tokens are purged first. The returned token is not saved yet.
async fn issue_token(state: &AppState, user_id: Uuid) -> Result<Token, AppError> {
    let cutoff = Utc::now() - Duration::minutes(state.auth.token_ttl_minutes);
    state.store.delete_tokens_created_before(cutoff).await?;
    state.store.delete_tokens_for_user(user_id).await?;

    for _ in 0..MAX_TOKEN_DRAWS {
        let value = generate_one_time_token();
        if state.store.find_token(&value).await?.is_none() {
            return Ok(Token::new(value, user_id));
        }
    }
    Err(AppError::InternalServerError(
        "No unused one-time token available".into(),
    ))
}

/// Looks up a one-time token, treating expired tokens as unknown.
async fn find_live_token(state: &AppState, value: &str) -> Result<Token, AppError> {
    let token = state
        .store
        .find_token(value)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    if token.is_expired(state.auth.token_ttl_minutes) {
        log::info!("token for user {} expired", token.user_id);
        state.store.delete_token(token.id).await?;
        return Err(AppError::Unauthorized("Token has expired".into()));
    }

    Ok(token)
}

async fn token_owner(state: &AppState, token: &Token) -> Result<User, AppError> {
    state
        .store
        .find_user_by_id(token.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn user_by_email(state: &AppState, email: &str) -> Result<User, AppError> {
    state
        .store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not registered".into()))
}

/// Replaces `user`'s confirmation token with a fresh one and emails it.
async fn send_confirmation_token(state: &AppState, user: &User) -> Result<(), AppError> {
    let token = issue_token(state, user.id).await?;
    state.store.save_token(&token).await?;

    let email = state.emails.confirmation(&Recipient {
        email: &user.email,
        name: &user.name,
        token: &token.token,
    });
    deliver(state.mailer.as_ref(), email).await;
    Ok(())
}

/// Create an account
///
/// Registers an unconfirmed user and emails a confirmation token.
///
/// ## Responses:
/// - `201 Created`: account created, confirmation token sent.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid input.
#[post("/create-account")]
pub async fn create_account(
    state: web::Data<AppState>,
    body: web::Json<CreateAccountRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if state.store.find_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let CreateAccountRequest {
        name,
        email,
        password,
        ..
    } = body.into_inner();
    let user = User::new(name, email, hash_password(&password, state.auth.bcrypt_cost)?);
    let token = issue_token(&state, user.id).await?;

    settle(join(state.store.save_user(&user), state.store.save_token(&token)).await)?;

    let email = state.emails.confirmation(&Recipient {
        email: &user.email,
        name: &user.name,
        token: &token.token,
    });
    deliver(state.mailer.as_ref(), email).await;

    log::info!("account created for user {}", user.id);
    Ok(HttpResponse::Created().json(message(
        "Account created, check your email to confirm it",
    )))
}

/// Confirm an account
///
/// Redeems a confirmation token: the owner becomes confirmed and the token is deleted.
#[post("/confirm-account")]
pub async fn confirm_account(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let token = find_live_token(&state, &body.token).await?;
    let mut user = token_owner(&state, &token).await?;
    user.confirmed = true;
    user.touch();

    settle(join(state.store.save_user(&user), state.store.delete_token(token.id)).await)?;

    log::info!("user {} confirmed", user.id);
    Ok(HttpResponse::Ok().json(message("Account confirmed successfully")))
}

/// Login
///
/// Authenticates a confirmed user and returns a session token. Unconfirmed users are
/// rejected and sent a fresh confirmation token.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !user.confirmed {
        send_confirmation_token(&state, &user).await?;
        return Err(AppError::Unauthorized(
            "Account not confirmed, a confirmation email has been sent".into(),
        ));
    }

    if !verify_password(&body.password, &user.password)? {
        log::warn!("failed login for user {}", user.id);
        return Err(AppError::Unauthorized("Password is incorrect".into()));
    }

    let token = generate_token(user.id, &state.auth)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// Request a new confirmation code
#[post("/request-code")]
pub async fn request_confirmation_code(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = user_by_email(&state, &body.email).await?;
    if user.confirmed {
        return Err(AppError::Forbidden("User already confirmed".into()));
    }

    send_confirmation_token(&state, &user).await?;
    Ok(HttpResponse::Ok().json(message("A new token has been sent to your email")))
}

/// Forgot password
///
/// Emails a password reset token.
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<EmailRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let user = user_by_email(&state, &body.email).await?;
    let token = issue_token(&state, user.id).await?;
    state.store.save_token(&token).await?;

    let email = state.emails.password_reset(&Recipient {
        email: &user.email,
        name: &user.name,
        token: &token.token,
    });
    deliver(state.mailer.as_ref(), email).await;

    Ok(HttpResponse::Ok().json(message("Check your email for the password reset")))
}

/// Validate a token
///
/// Checks a reset token without redeeming it.
#[post("/validate-token")]
pub async fn validate_token(
    state: web::Data<AppState>,
    body: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    find_live_token(&state, &body.token).await?;
    Ok(HttpResponse::Ok().json(message("Token is valid, you can reset your password")))
}

/// Reset the password with a token
///
/// Redeems a reset token: sets the new password and deletes the token.
#[post("/update-password/{token}")]
pub async fn update_password_with_token(
    state: web::Data<AppState>,
    path: web::Path<ResetTokenPath>,
    body: web::Json<NewPasswordRequest>,
) -> Result<impl Responder, AppError> {
    path.validate()?;
    body.validate()?;

    let token = find_live_token(&state, &path.token).await?;
    let mut user = token_owner(&state, &token).await?;
    user.password = hash_password(&body.password, state.auth.bcrypt_cost)?;
    user.touch();

    settle(join(state.store.save_user(&user), state.store.delete_token(token.id)).await)?;

    log::info!("password reset for user {}", user.id);
    Ok(HttpResponse::Ok().json(message("The password has been updated successfully")))
}

/// Current user
///
/// Returns the authenticated user without the password hash.
#[get("/user", wrap = "AuthMiddleware")]
pub async fn get_user(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}

/// Update profile
#[put("/profile", wrap = "AuthMiddleware")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if let Some(existing) = state.store.find_user_by_email(&body.email).await? {
        if existing.id != user.id {
            return Err(AppError::Conflict("This email is already in use".into()));
        }
    }

    let UpdateProfileRequest { name, email } = body.into_inner();
    let mut user = user.0;
    user.name = name;
    user.email = email;
    user.touch();
    state.store.save_user(&user).await?;

    Ok(HttpResponse::Ok().json(message("Profile updated successfully")))
}

/// Change password
///
/// Requires the current password.
#[post("/update-password", wrap = "AuthMiddleware")]
pub async fn update_current_user_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<UpdatePasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if !verify_password(&body.current_password, &user.password)? {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    let mut user = user.0;
    user.password = hash_password(&body.password, state.auth.bcrypt_cost)?;
    user.touch();
    state.store.save_user(&user).await?;

    Ok(HttpResponse::Ok().json(message("Password updated successfully")))
}

/// Check password
///
/// Confirms the authenticated user's password, e.g. before a destructive action.
#[post("/check-password", wrap = "AuthMiddleware")]
pub async fn check_password(
    user: AuthenticatedUser,
    body: web::Json<CheckPasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if !verify_password(&body.password, &user.password)? {
        return Err(AppError::Unauthorized("Password is incorrect".into()));
    }

    Ok(HttpResponse::Ok().json(message("Password is correct")))
}
