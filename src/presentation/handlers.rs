use crate::application::auth_service::AuthService;
use crate::application::catalog_service::CatalogService;
use crate::application::inventory_service::InventoryService;
use crate::domain::error::DomainError;
use crate::domain::models::{InventoryAction, InventoryForm, NewRecipe};
use crate::infrastructure::config::Config;
use crate::infrastructure::database::Stores;
use crate::presentation::session::{FLASH_COOKIE, Flash, SessionContext, removal_cookie};
use crate::presentation::views;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub inventory_service: InventoryService,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(stores: Stores, config: &Config) -> Self {
        let catalog_service = Arc::new(CatalogService::new(stores.recipes, stores.ingredients));
        Self {
            auth_service: Arc::new(AuthService::new(
                stores.users,
                config.session_secret.clone(),
                config.session_ttl_secs,
            )),
            inventory_service: InventoryService::new(catalog_service.clone(), stores.inventory),
            catalog_service,
            cookie_secure: config.cookie_secure,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 303 back to the home page carrying a one-shot notice.
pub fn redirect_with_flash(location: &str, flash: Flash) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(flash.cookie())
        .finish()
}

/// 200 HTML page; consumes the flash cookie the page just displayed.
pub fn render_page(session: &SessionContext, html: String) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type("text/html; charset=utf-8");
    if session.flash.is_some() {
        builder.cookie(removal_cookie(FLASH_COOKIE));
    }
    builder.body(html)
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::SEE_OTHER,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        match self {
            AppError::InvalidCredentials => {
                warn!(status = %status, "Invalid credentials");
                return redirect_with_flash("/", Flash::InvalidCredentials);
            }
            AppError::Unauthenticated => {
                warn!(status = %status, "Unauthenticated access, redirecting to login");
                return redirect_with_flash("/", Flash::LoginRequired);
            }
            AppError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            AppError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            AppError::Conflict(_) => warn!(error = %error_msg, status = %status, "Conflict"),
            AppError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            AppError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        // Server-side details stay in the log.
        let message = match self {
            AppError::Database(_) | AppError::Internal(_) => "Something went wrong.".to_string(),
            _ => error_msg,
        };
        let title = status.canonical_reason().unwrap_or("Error");

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(views::error_page(title, &message))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::NotFound(msg)) => AppError::NotFound(msg.clone()),
            Some(DomainError::InvalidCredentials) => AppError::InvalidCredentials,
            Some(DomainError::Validation(msg)) => AppError::Validation(msg.clone()),
            Some(DomainError::Conflict(msg)) => AppError::Conflict(msg.clone()),
            Some(DomainError::Internal(msg)) => AppError::Internal(msg.clone()),
            None => AppError::Database(format!("{:#}", err)),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip_all)]
pub async fn home(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    let recipes = state.catalog_service.list_recipes().await?;
    Ok(render_page(&session, views::home(&session, &recipes)))
}

pub async fn add_recipe_form(session: SessionContext) -> HttpResponse {
    render_page(&session, views::add_recipe(&session))
}

#[instrument(skip_all, fields(name = %form.name))]
pub async fn add_recipe(
    state: web::Data<AppState>,
    form: web::Form<NewRecipe>,
) -> Result<HttpResponse, AppError> {
    let recipe = state
        .catalog_service
        .add_recipe(form.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to add recipe");
            e
        })?;
    info!(recipe_id = recipe.id, "Recipe created");
    Ok(redirect_with_flash("/", Flash::RecipeAdded))
}

#[instrument(skip(state, session), fields(recipe_id = %*path))]
pub async fn recipe_detail(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let recipe = state.catalog_service.get_recipe(path.into_inner()).await?;
    Ok(render_page(&session, views::recipe_detail(&session, &recipe)))
}

#[instrument(skip_all)]
pub async fn inventory(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    let user = session.require_user()?;
    let names = state.inventory_service.list(user.id).await?;
    Ok(render_page(&session, views::inventory(&session, None, &names)))
}

#[instrument(skip_all, fields(user_id, name = %form.name, action = ?form.action))]
pub async fn update_inventory(
    state: web::Data<AppState>,
    session: SessionContext,
    form: web::Form<InventoryForm>,
) -> Result<HttpResponse, AppError> {
    let user = session.require_user()?;
    tracing::Span::current().record("user_id", user.id);
    let InventoryForm { name, action } = form.into_inner();

    state
        .inventory_service
        .apply(user.id, &name, action)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update inventory");
            e
        })?;

    let notice = match action {
        InventoryAction::Add => format!("Added {} to inventory", name.trim()),
        InventoryAction::Remove => format!("Removed {} from inventory", name.trim()),
    };
    let names = state.inventory_service.list(user.id).await?;
    Ok(render_page(
        &session,
        views::inventory(&session, Some(notice.as_str()), &names),
    ))
}

#[instrument(skip_all)]
pub async fn my_recipes(
    state: web::Data<AppState>,
    session: SessionContext,
) -> Result<HttpResponse, AppError> {
    let user = session.require_user()?;
    let matches = state.inventory_service.my_recipes(user.id).await?;
    info!(user_id = user.id, recipes = matches.len(), "Matched recipes");
    Ok(render_page(&session, views::my_recipes(&session, &matches)))
}
