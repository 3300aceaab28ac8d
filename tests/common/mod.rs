#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test, web};
use pantry_app::domain::user::RegisterForm;
use pantry_app::infrastructure::config::Config;
use pantry_app::infrastructure::database::Stores;
use pantry_app::presentation::handlers::AppState;
use std::collections::HashMap;

pub fn test_config() -> Config {
    let vars = HashMap::from([(
        "SESSION_SECRET".to_string(),
        "test-secret-key-for-testing-only".to_string(),
    )]);
    Config::from_vars(&vars).unwrap()
}

pub async fn state_with_user(stores: Stores, username: &str, password: &str) -> web::Data<AppState> {
    let state = web::Data::new(AppState::new(stores, &test_config()));
    state
        .auth_service
        .register(RegisterForm {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
        .unwrap();
    state
}

pub fn response_cookie(resp: &ServiceResponse, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn location(resp: &ServiceResponse) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(resp: ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}
