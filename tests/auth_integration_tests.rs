mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use common::{body_text, location, response_cookie, state_with_user, test_config};
use pantry_app::domain::user::{LoginForm, RegisterForm};
use pantry_app::infrastructure::database::Stores;
use pantry_app::presentation::handlers::AppState;
use pantry_app::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use pantry_app::presentation::routes;

macro_rules! setup_auth_test {
    ($state:expr) => {{
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(TimingMiddleware)
                .wrap(RequestIdMiddleware)
                .configure(routes::configure),
        )
        .await
    }};
}

fn login_form(username: &str, password: &str) -> LoginForm {
    LoginForm {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[actix_web::test]
async fn test_login_sets_session_and_redirects_home() {
    let state = state_with_user(Stores::in_memory(), "alice", "password123").await;
    let app = setup_auth_test!(state);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(login_form("alice", "password123"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/"));
    let session = response_cookie(&resp, "session").expect("session cookie");
    assert!(!session.value().is_empty());
    let flash = response_cookie(&resp, "flash").expect("flash cookie");

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session)
        .cookie(flash)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    // The page consumes the flash
    let cleared = response_cookie(&resp, "flash").expect("flash removal");
    assert!(cleared.value().is_empty());
    let body = body_text(resp).await;
    assert!(body.contains("Logged in as alice"));
    assert!(body.contains("Login successful!"));
}

#[actix_web::test]
async fn test_login_failure_is_generic() {
    let state = state_with_user(Stores::in_memory(), "alice", "password123").await;
    let app = setup_auth_test!(state);

    for form in [login_form("alice", "wrong"), login_form("nobody", "password123")] {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_form(form)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp).as_deref(), Some("/"));
        assert!(response_cookie(&resp, "session").is_none());
        assert_eq!(
            response_cookie(&resp, "flash").unwrap().value(),
            "invalid-credentials"
        );
    }
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let state = state_with_user(Stores::in_memory(), "alice", "password123").await;
    let app = setup_auth_test!(state);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(login_form("alice", "password123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let session = response_cookie(&resp, "session").unwrap();

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let removed = response_cookie(&resp, "session").expect("session removal cookie");
    assert!(removed.value().is_empty());
    assert_eq!(response_cookie(&resp, "flash").unwrap().value(), "logged-out");
}

#[actix_web::test]
async fn test_register_logs_user_in() {
    let state = web::Data::new(AppState::new(Stores::in_memory(), &test_config()));
    let app = setup_auth_test!(state);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(RegisterForm {
            username: "bob".to_string(),
            password: "hunter2".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let session = response_cookie(&resp, "session").expect("session cookie");

    let req = test::TestRequest::get()
        .uri("/inventory")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Logged in as bob"));
}

#[actix_web::test]
async fn test_register_duplicate_username_conflicts() {
    let state = state_with_user(Stores::in_memory(), "alice", "pw").await;
    let app = setup_auth_test!(state);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(RegisterForm {
            username: "alice".to_string(),
            password: "other".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_forged_session_cookie_is_anonymous() {
    let state = state_with_user(Stores::in_memory(), "alice", "pw").await;
    let app = setup_auth_test!(state);

    let req = test::TestRequest::get()
        .uri("/inventory")
        .cookie(actix_web::cookie::Cookie::new("session", "not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(response_cookie(&resp, "flash").unwrap().value(), "login-required");
}

#[actix_web::test]
async fn test_responses_carry_request_id_and_timing() {
    let state = web::Data::new(AppState::new(Stores::in_memory(), &test_config()));
    let app = setup_auth_test!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.headers().contains_key("x-response-time"));

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
