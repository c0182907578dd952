//! Integration tests for login, logout and the route guard against a mock
//! backend.

mod common;

use std::sync::atomic::Ordering;

use common::{bearer, summary_json, Harness, ReadOnlyBackend};
use serde_json::json;
use shopdash_core::{ApiError, GuardOutcome, LoginError, Navigation, Route, RouteGuard, TokenKind};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_login(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .and(body_json(json!({"username": "admin", "password": "admin"})))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_both_tokens_and_opens_dashboard() {
    let server = MockServer::start().await;
    let mut h = Harness::new(&server).await;
    h.session.restore();

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
    )
    .await;

    assert!(h.session.login("admin", "admin").await);
    assert!(h.session.is_authenticated());
    assert_eq!(h.store.get(TokenKind::Access).unwrap().as_deref(), Some("a1"));
    assert_eq!(h.store.get(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    assert_eq!(h.navigations(), vec![Navigation::push(Route::Dashboard)]);
}

#[tokio::test]
async fn test_login_accepts_long_token_keys() {
    let server = MockServer::start().await;
    let h = Harness::new(&server).await;

    mount_login(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"access_token": "a1", "refresh_token": "r1"})),
    )
    .await;

    h.session.try_login("admin", "admin").await.unwrap();
    assert_eq!(h.store.get(TokenKind::Access).unwrap().as_deref(), Some("a1"));
    // Logging in ends the loading phase even without restore()
    assert!(!h.session.is_loading());
}

#[tokio::test]
async fn test_login_that_cannot_be_saved_clears_the_store() {
    let server = MockServer::start().await;
    let backend = ReadOnlyBackend::default();
    let clears = backend.clears.clone();
    let mut h = Harness::with_backend(&server, backend).await;
    h.session.restore();

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
    )
    .await;

    let result = h.session.try_login("admin", "admin").await;
    assert!(matches!(result, Err(LoginError::Storage(_))));
    assert_eq!(clears.load(Ordering::SeqCst), 1);
    assert!(!h.session.is_authenticated());
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn test_rejected_login_leaves_storage_untouched() {
    let server = MockServer::start().await;
    let mut h = Harness::new(&server).await.with_tokens("prior-a", "prior-r");
    h.session.restore();

    mount_login(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({"detail": "No active account"})),
    )
    .await;

    let result = h.session.try_login("admin", "admin").await;
    assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    assert_eq!(h.store.get(TokenKind::Access).unwrap().as_deref(), Some("prior-a"));
    assert_eq!(h.store.get(TokenKind::Refresh).unwrap().as_deref(), Some("prior-r"));
    assert!(h.navigations().is_empty());
}

#[tokio::test]
async fn test_login_server_error_is_reported() {
    let server = MockServer::start().await;
    let h = Harness::new(&server).await;

    mount_login(&server, ResponseTemplate::new(503)).await;

    let result = h.session.try_login("admin", "admin").await;
    assert!(matches!(result, Err(LoginError::Api(ApiError::ServerError(_)))));
    assert_eq!(h.store.get(TokenKind::Access).unwrap(), None);
}

#[tokio::test]
async fn test_login_without_tokens_in_response_fails() {
    let server = MockServer::start().await;
    let h = Harness::new(&server).await;

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"access": "", "refresh": "r1"})),
    )
    .await;

    assert!(!h.session.login("admin", "admin").await);
    assert_eq!(h.store.get(TokenKind::Refresh).unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_tokens_and_replaces_with_login() {
    let server = MockServer::start().await;
    let mut h = Harness::new(&server).await.with_tokens("a1", "r1");
    h.session.restore();

    h.session.logout().unwrap();
    assert!(!h.session.is_authenticated());
    assert_eq!(h.store.get(TokenKind::Access).unwrap(), None);
    assert_eq!(h.store.get(TokenKind::Refresh).unwrap(), None);
    assert_eq!(h.navigations(), vec![Navigation::replace(Route::Login)]);
}

#[tokio::test]
async fn test_guard_follows_session_through_its_lifecycle() {
    let server = MockServer::start().await;
    let h = Harness::new(&server).await;
    let guard = RouteGuard::default();

    assert_eq!(
        guard.evaluate(h.session.state(), Route::Orders),
        GuardOutcome::Placeholder
    );

    h.session.restore();
    assert_eq!(
        guard.evaluate(h.session.state(), Route::Orders),
        GuardOutcome::Redirect {
            to: Route::Login,
            replace: true
        }
    );
    assert_eq!(
        guard.evaluate(h.session.state(), Route::Login),
        GuardOutcome::Render(Route::Login)
    );

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
    )
    .await;
    h.session.try_login("admin", "admin").await.unwrap();
    assert_eq!(
        guard.evaluate(h.session.state(), Route::Orders),
        GuardOutcome::Render(Route::Orders)
    );
}

#[tokio::test]
async fn test_session_token_is_used_by_the_client() {
    let server = MockServer::start().await;
    let h = Harness::new(&server).await;
    h.session.restore();

    mount_login(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/summary/"))
        .and(header("authorization", bearer("a1").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_json()))
        .expect(1)
        .mount(&server)
        .await;

    h.session.try_login("admin", "admin").await.unwrap();
    let summary = h.client.dashboard_summary().await.unwrap();
    assert_eq!(summary.total_products, 14);
    assert_eq!(summary.total_revenue, 980.0);
}
