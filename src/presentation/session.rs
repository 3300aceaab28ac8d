//! Per-request session context.
//!
//! The logged-in identity travels in a signed `session` cookie and is
//! resolved once per request into a [`SessionContext`], which handlers take
//! as an ordinary argument. One-shot notices ride in a `flash` cookie set
//! on redirects and cleared by the page that shows them.

use crate::domain::user::User;
use crate::presentation::handlers::{AppError, AppState};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{FromRequest, HttpRequest, web};
use std::future::Future;
use std::pin::Pin;
use tracing::trace;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Notices shown once on the page a redirect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoginSucceeded,
    InvalidCredentials,
    LoggedOut,
    LoginRequired,
    RecipeAdded,
    Registered,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::LoginSucceeded => "login-succeeded",
            Flash::InvalidCredentials => "invalid-credentials",
            Flash::LoggedOut => "logged-out",
            Flash::LoginRequired => "login-required",
            Flash::RecipeAdded => "recipe-added",
            Flash::Registered => "registered",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [
            Flash::LoginSucceeded,
            Flash::InvalidCredentials,
            Flash::LoggedOut,
            Flash::LoginRequired,
            Flash::RecipeAdded,
            Flash::Registered,
        ]
        .into_iter()
        .find(|flash| flash.code() == code)
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::LoginSucceeded => "Login successful!",
            Flash::InvalidCredentials => "Invalid credentials",
            Flash::LoggedOut => "Logged out.",
            Flash::LoginRequired => "Please login first",
            Flash::RecipeAdded => "Recipe added successfully!",
            Flash::Registered => "Account created, you are now logged in.",
        }
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub user: Option<AuthenticatedUser>,
    pub flash: Option<Flash>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthenticated)
    }
}

impl FromRequest for SessionContext {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
        let flash = req
            .cookie(FLASH_COOKIE)
            .and_then(|c| Flash::from_code(c.value()));

        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".to_string()))?;
            let user = match token {
                Some(token) if !token.is_empty() => state.auth_service.resolve_session(&token).await?,
                _ => None,
            };
            trace!(authenticated = user.is_some(), "Session resolved");
            Ok(SessionContext {
                user: user.map(AuthenticatedUser::from),
                flash,
            })
        })
    }
}
