use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginForm, RegisterForm, User};
use crate::infrastructure::security::{
    generate_session_token, hash_password, validate_session_token, verify_password,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    session_secret: String,
    session_ttl_secs: u64,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_secret: String,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            user_repository,
            session_secret,
            session_ttl_secs,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterForm) -> Result<User> {
        trace!("Starting user registration");
        let username = req.username.trim();
        if username.is_empty() {
            return Err(DomainError::Validation("Username is required".to_string()).into());
        }
        if req.password.is_empty() {
            return Err(DomainError::Validation("Password is required".to_string()).into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = self
            .user_repository
            .create_user(username, &password_hash)
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered successfully");
        Ok(user)
    }

    /// Returns the user when `password` matches, `None` for an unknown
    /// username or a wrong password alike.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.user_repository.find_user_by_username(username).await? else {
            debug!("Unknown username");
            return Ok(None);
        };

        let is_valid = verify_password(password, &user.password_hash).map_err(|e| {
            error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if is_valid {
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "Password mismatch");
            Ok(None)
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginForm) -> Result<User> {
        match self.verify(&req.username, &req.password).await? {
            Some(user) => {
                info!(user_id = user.id, "Login successful");
                Ok(user)
            }
            None => {
                warn!("Login rejected");
                Err(DomainError::InvalidCredentials.into())
            }
        }
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<User>> {
        self.user_repository.find_user_by_id(user_id).await
    }

    pub fn issue_session_token(&self, user: &User) -> Result<String> {
        let token = generate_session_token(user.id, &self.session_secret, self.session_ttl_secs)
            .map_err(|e| {
                error!(error = %e, "Failed to generate session token");
                DomainError::Internal(format!("Failed to generate session token: {}", e))
            })?;
        Ok(token)
    }

    /// Resolves a session cookie to its user. Invalid, expired, or orphaned
    /// tokens resolve to `None`.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<User>> {
        match validate_session_token(token, &self.session_secret) {
            Some(user_id) => self.get(user_id).await,
            None => {
                trace!("Session token rejected");
                Ok(None)
            }
        }
    }
}
