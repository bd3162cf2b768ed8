#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, Error,
};
use serde_json::{json, Value};
use uptask::config::AuthSettings;
use uptask::mail::{Email, MemoryMailer};
use uptask::state::AppState;
use uptask::store::MemoryStore;

pub const PASSWORD: &str = "Password123!";

/// Builds the API over `$state`, the way `main.rs` mounts it.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .service(uptask::routes::health::health)
                .service(actix_web::web::scope("/api").configure(uptask::routes::config)),
        )
        .await
    };
}

pub struct TestContext {
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_token_ttl(10)
    }

    pub fn with_token_ttl(token_ttl_minutes: i64) -> Self {
        let mailer = Arc::new(MemoryMailer::new());
        let auth = AuthSettings {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expiration_hours: 1,
            token_ttl_minutes,
            bcrypt_cost: 4,
        };
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            mailer.clone(),
            auth,
            "UpTask <test@uptask.com>",
        );
        Self { state, mailer }
    }

    /// The one-time code in the last email sent to `to`.
    pub async fn code_for(&self, to: &str) -> String {
        let email = self
            .mailer
            .last_to(to)
            .await
            .unwrap_or_else(|| panic!("no email sent to {}", to));
        code_from(&email)
    }
}

pub fn code_from(email: &Email) -> String {
    let start = email
        .text
        .find("Enter your code: ")
        .expect("email carries a code")
        + "Enter your code: ".len();
    email.text[start..start + 6].to_string()
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

/// Sends `req` and returns the status and JSON body, including responses built from
/// middleware errors.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, to_bytes(resp.into_body()).await.unwrap())
        }
    };
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn create_account<S, B>(app: &S, name: &str, email: &str) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/create-account")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": PASSWORD,
            "password_confirmation": PASSWORD
        }))
        .to_request();
    send(app, req).await.0
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    send(app, req).await
}

/// Registers, confirms and logs in a user.
pub async fn confirmed_user<S, B>(app: &S, ctx: &TestContext, name: &str, email: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    assert_eq!(create_account(app, name, email).await, StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": ctx.code_for(email).await }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "confirm failed: {}", body);

    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    TestUser {
        id: body["user_id"].as_str().expect("user_id").to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub async fn create_project<S, B>(app: &S, user: &TestUser, name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer(&user.token))
        .set_json(json!({
            "projectName": name,
            "clientName": "ACME",
            "description": "Client work"
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
    body["id"].as_str().expect("project id").to_string()
}

pub async fn add_member<S, B>(app: &S, manager: &TestUser, project_id: &str, member: &TestUser) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/team", project_id))
        .insert_header(bearer(&manager.token))
        .set_json(json!({ "id": member.id }))
        .to_request();
    send(app, req).await.0
}

pub async fn create_task<S, B>(app: &S, user: &TestUser, project_id: &str, name: &str) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/projects/{}/tasks", project_id))
        .insert_header(bearer(&user.token))
        .set_json(json!({ "name": name, "description": "Do the thing" }))
        .to_request();
    send(app, req).await
}
