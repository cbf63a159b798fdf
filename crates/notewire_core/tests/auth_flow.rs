mod common;

use common::{seeded_app, test_app};
use notewire_core::{AppError, NoticeLevel};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_success_body() -> serde_json::Value {
    json!({
        "success": true,
        "token": "tok-login",
        "user": { "id": "u-1", "name": "Ada", "email": "ada@example.com" }
    })
}

fn notes_body(notes: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "notes": notes })
}

#[tokio::test]
async fn login_normalizes_email_and_establishes_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_success_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("Authorization", "Bearer tok-login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notes_body(json!([
            { "id": "n-1", "title": "First", "content": "body" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = test_app(&server.uri());
    app.login("  Ada@Example.COM ", "secret1")
        .await
        .expect("login should succeed");

    assert!(app.session().is_authenticated());
    assert_eq!(app.session().token(), "tok-login");
    assert_eq!(
        app.session().user().map(|user| user.email.as_str()),
        Some("ada@example.com")
    );
    assert_eq!(app.notes().len(), 1);
    assert!(app
        .presenter()
        .has_notice(NoticeLevel::Success, "Login successful!"));
}

#[tokio::test]
async fn rejected_login_surfaces_server_error_and_stays_signed_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let mut app = test_app(&server.uri());
    let err = app
        .login("ada@example.com", "wrong-pass")
        .await
        .expect_err("login should be rejected");

    match err {
        AppError::Rejected(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn invalid_login_email_never_reaches_the_network() {
    let server = MockServer::start().await;

    let mut app = test_app(&server.uri());
    let err = app
        .login("not-an-email", "secret1")
        .await
        .expect_err("validation should fail");
    assert!(matches!(err, AppError::Credentials(_)));

    let received = server
        .received_requests()
        .await
        .expect("request recording is on");
    assert!(received.is_empty());
}

#[tokio::test]
async fn registration_validations_block_network_in_form_order() {
    let server = MockServer::start().await;
    let mut app = test_app(&server.uri());

    for (name, email, password, confirm) in [
        ("A", "ada@example.com", "secret1", "secret1"),
        ("Ada", "ada@mailinator.com", "secret1", "secret1"),
        ("Ada", "ada@example.com", "short", "short"),
        ("Ada", "ada@example.com", "secret1", "secret2"),
    ] {
        let err = app
            .register(name, email, password, confirm)
            .await
            .expect_err("registration should be rejected locally");
        assert!(matches!(err, AppError::Credentials(_)));
    }

    let received = server
        .received_requests()
        .await
        .expect("request recording is on");
    assert!(received.is_empty());
}

#[tokio::test]
async fn registration_success_signs_the_user_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-register",
            "user": { "id": "u-1", "name": "Ada", "email": "ada@example.com" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notes_body(json!([]))))
        .mount(&server)
        .await;

    let mut app = test_app(&server.uri());
    app.register(" Ada ", "Ada@Example.com", "secret1", "secret1")
        .await
        .expect("registration should succeed");

    assert!(app.session().is_authenticated());
    assert!(app
        .presenter()
        .has_notice(NoticeLevel::Success, "Account created successfully!"));
}

#[tokio::test]
async fn unauthorized_response_clears_session_with_one_notice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "jwt expired"
        })))
        .mount(&server)
        .await;

    let mut app = seeded_app(&server.uri(), "tok-stale");
    assert!(app.session().is_authenticated());

    app.load_notes(true)
        .await
        .expect("load degrades without erroring");

    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().token(), "");
    assert!(app.notes().is_empty());
    assert_eq!(app.presenter().count_containing("Session expired"), 1);
    assert_eq!(app.presenter().login_routes, 1);
}

#[tokio::test]
async fn non_json_response_synthesizes_invalid_format_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!doctype html>"))
        .mount(&server)
        .await;

    let mut app = test_app(&server.uri());
    let err = app
        .login("ada@example.com", "secret1")
        .await
        .expect_err("non-JSON body should fail the call");

    match err {
        AppError::Rejected(message) => assert_eq!(message, "Invalid response format"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_emits_one_network_notice() {
    // Nothing listens on this port; connection is refused immediately.
    let mut app = test_app("http://127.0.0.1:1");

    let err = app
        .login("ada@example.com", "secret1")
        .await
        .expect_err("unreachable server should fail");

    assert!(matches!(err, AppError::Api(_)));
    assert_eq!(app.presenter().count_containing("Network error"), 1);
}

#[tokio::test]
async fn verify_session_clears_a_stale_restored_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verify-token"))
        .and(header("Authorization", "Bearer tok-stale"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let mut app = seeded_app(&server.uri(), "tok-stale");
    app.verify_session().await.expect("verify should not error");

    assert!(!app.session().is_authenticated());
    assert_eq!(app.presenter().login_routes, 1);
}

#[tokio::test]
async fn verify_session_keeps_a_valid_restored_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/verify-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let mut app = seeded_app(&server.uri(), "tok-valid");
    app.verify_session().await.expect("verify should not error");

    assert!(app.session().is_authenticated());
    assert_eq!(app.presenter().login_routes, 0);
}

#[tokio::test]
async fn logout_clears_session_and_routes_to_login() {
    let server = MockServer::start().await;

    let mut app = seeded_app(&server.uri(), "tok-valid");
    app.logout().expect("logout should succeed");

    assert!(!app.session().is_authenticated());
    assert_eq!(app.presenter().login_routes, 1);
    assert!(app
        .presenter()
        .has_notice(NoticeLevel::Success, "Logged out successfully"));

    let received = server
        .received_requests()
        .await
        .expect("request recording is on");
    assert!(received.is_empty());
}
