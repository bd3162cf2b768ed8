#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, confirmed_user, create_account, login, send, TestContext, PASSWORD};
use pretty_assertions::assert_eq;
use serde_json::json;

#[actix_rt::test]
async fn test_create_account_and_confirm_flow() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    assert_eq!(
        create_account(&app, "Ada", "ada@example.com").await,
        StatusCode::CREATED
    );

    // Same email again
    assert_eq!(
        create_account(&app, "Ada Again", "ada@example.com").await,
        StatusCode::CONFLICT
    );

    let sent = ctx.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert_eq!(sent[0].subject, "UpTask - Confirm your account");

    let code = ctx.code_for("ada@example.com").await;
    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": code }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    // The token is consumed
    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": code }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = login(&app, "ada@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["user_id"].is_string());
}

#[actix_rt::test]
async fn test_create_account_validation() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/create-account")
        .set_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": PASSWORD,
            "password_confirmation": "something else"
        }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Missing fields never reach validation
    let req = test::TestRequest::post()
        .uri("/api/auth/create-account")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(ctx.mailer.sent().await.is_empty());
}

#[actix_rt::test]
async fn test_confirm_with_unknown_token() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": "12ab34" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[actix_rt::test]
async fn test_expired_token_is_rejected() {
    let ctx = TestContext::with_token_ttl(0);
    let app = init_app!(ctx.state);

    assert_eq!(
        create_account(&app, "Ada", "ada@example.com").await,
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": ctx.code_for("ada@example.com").await }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has expired");
}

#[actix_rt::test]
async fn test_login_rules() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    let (status, _) = login(&app, "nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(
        create_account(&app, "Ada", "ada@example.com").await,
        StatusCode::CREATED
    );

    // Unconfirmed: rejected, and a fresh code goes out
    let (status, _) = login(&app, "ada@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.mailer.sent().await.len(), 2);

    let req = test::TestRequest::post()
        .uri("/api/auth/confirm-account")
        .set_json(json!({ "token": ctx.code_for("ada@example.com").await }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let (status, _) = login(&app, "ada@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = login(&app, "ada@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_request_code_for_confirmed_user() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    confirmed_user(&app, &ctx, "Ada", "ada@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/request-code")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/auth/request-code")
        .set_json(json!({ "email": "nobody@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    confirmed_user(&app, &ctx, "Ada", "ada@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let email = ctx.mailer.last_to("ada@example.com").await.unwrap();
    assert_eq!(email.subject, "UpTask - Reset your password");
    let code = common::code_from(&email);

    let req = test::TestRequest::post()
        .uri("/api/auth/validate-token")
        .set_json(json!({ "token": code }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    // Reset codes are six digits
    let req = test::TestRequest::post()
        .uri("/api/auth/update-password/abc")
        .set_json(json!({ "password": "NewPassword1!", "password_confirmation": "NewPassword1!" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri(&format!("/api/auth/update-password/{}", code))
        .set_json(json!({ "password": "NewPassword1!", "password_confirmation": "NewPassword1!" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    assert_eq!(
        login(&app, "ada@example.com", PASSWORD).await.0,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login(&app, "ada@example.com", "NewPassword1!").await.0,
        StatusCode::OK
    );

    // Redeemed
    let req = test::TestRequest::post()
        .uri("/api/auth/validate-token")
        .set_json(json!({ "token": code }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_current_user_requires_bearer() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    let user = confirmed_user(&app, &ctx, "Ada", "ada@example.com").await;

    let req = test::TestRequest::get().uri("/api/auth/user").to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/auth/user")
        .insert_header(bearer("not.a.jwt"))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/auth/user")
        .insert_header(bearer(&user.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password").is_none());
}

#[actix_rt::test]
async fn test_profile_and_password_updates() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    let ada = confirmed_user(&app, &ctx, "Ada", "ada@example.com").await;
    confirmed_user(&app, &ctx, "Grace", "grace@example.com").await;

    let req = test::TestRequest::put()
        .uri("/api/auth/profile")
        .insert_header(bearer(&ada.token))
        .set_json(json!({ "name": "Ada", "email": "grace@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri("/api/auth/profile")
        .insert_header(bearer(&ada.token))
        .set_json(json!({ "name": "Ada Lovelace", "email": "lovelace@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/check-password")
        .insert_header(bearer(&ada.token))
        .set_json(json!({ "password": "wrong-password" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/update-password")
        .insert_header(bearer(&ada.token))
        .set_json(json!({
            "current_password": PASSWORD,
            "password": "NewPassword1!",
            "password_confirmation": "NewPassword1!"
        }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/check-password")
        .insert_header(bearer(&ada.token))
        .set_json(json!({ "password": "NewPassword1!" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    assert_eq!(
        login(&app, "lovelace@example.com", "NewPassword1!").await.0,
        StatusCode::OK
    );
}

#[actix_rt::test]
async fn test_new_code_supersedes_older_ones() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);
    confirmed_user(&app, &ctx, "Ada", "ada@example.com").await;

    let mut codes = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/auth/forgot-password")
            .set_json(json!({ "email": "ada@example.com" }))
            .to_request();
        assert_eq!(send(&app, req).await.0, StatusCode::OK);
        codes.push(ctx.code_for("ada@example.com").await);
    }

    let validate = |code: &str| {
        test::TestRequest::post()
            .uri("/api/auth/validate-token")
            .set_json(json!({ "token": code }))
            .to_request()
    };
    assert_eq!(send(&app, validate(&codes[0])).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, validate(&codes[1])).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, validate(&codes[2])).await.0, StatusCode::OK);
}

#[actix_rt::test]
async fn test_unconfirmed_login_replaces_confirmation_code() {
    let ctx = TestContext::new();
    let app = init_app!(ctx.state);

    assert_eq!(
        create_account(&app, "Ada", "ada@example.com").await,
        StatusCode::CREATED
    );
    let first = ctx.code_for("ada@example.com").await;

    assert_eq!(
        login(&app, "ada@example.com", PASSWORD).await.0,
        StatusCode::UNAUTHORIZED
    );
    let second = ctx.code_for("ada@example.com").await;

    let confirm = |code: &str| {
        test::TestRequest::post()
            .uri("/api/auth/confirm-account")
            .set_json(json!({ "token": code }))
            .to_request()
    };
    assert_eq!(send(&app, confirm(&first)).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, confirm(&second)).await.0, StatusCode::OK);
}

#[actix_rt::test]
async fn test_validate_token_rejects_expired_code() {
    let ctx = TestContext::with_token_ttl(0);
    let app = init_app!(ctx.state);

    assert_eq!(
        create_account(&app, "Ada", "ada@example.com").await,
        StatusCode::CREATED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/forgot-password")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/validate-token")
        .set_json(json!({ "token": ctx.code_for("ada@example.com").await }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token has expired");
}
