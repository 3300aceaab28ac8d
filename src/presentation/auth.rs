use crate::domain::user::{LoginForm, RegisterForm};
use crate::presentation::handlers::{AppError, AppState, redirect_with_flash, render_page};
use crate::presentation::session::{
    Flash, SESSION_COOKIE, SessionContext, removal_cookie, session_cookie,
};
use crate::presentation::views;
use actix_web::{HttpResponse, web};
use tracing::{error, info, instrument};

pub async fn login_form(session: SessionContext) -> HttpResponse {
    render_page(&session, views::login(&session))
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");
    let user = state.auth_service.login(form.into_inner()).await?;
    let token = state.auth_service.issue_session_token(&user)?;

    let mut response = redirect_with_flash("/", Flash::LoginSucceeded);
    response
        .add_cookie(&session_cookie(token, state.cookie_secure))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

#[instrument(skip_all)]
pub async fn logout(session: SessionContext) -> Result<HttpResponse, AppError> {
    if let Some(user) = &session.user {
        info!(user_id = user.id, "Logging out");
    }
    let mut response = redirect_with_flash("/", Flash::LoggedOut);
    response
        .add_cookie(&removal_cookie(SESSION_COOKIE))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

pub async fn register_form(session: SessionContext) -> HttpResponse {
    render_page(&session, views::register(&session))
}

#[instrument(skip_all, fields(username = %form.username))]
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .auth_service
        .register(form.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            e
        })?;
    let token = state.auth_service.issue_session_token(&user)?;

    let mut response = redirect_with_flash("/", Flash::Registered);
    response
        .add_cookie(&session_cookie(token, state.cookie_secure))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}
