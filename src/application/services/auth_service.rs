//! Account registration, login and token checks.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::TokenService;
use crate::application::validation::{is_blank, validate_login, validate_registration};
use crate::domain::entities::NewUser;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::clock::Clock;
use crate::utils::password::PasswordHasher;

/// A freshly issued token and the username it was issued for.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub username: String,
}

/// Service for account registration and credential checks.
///
/// Login failures never reveal whether the username exists: both a missing
/// user and a wrong password produce [`AppError::invalid_credentials`].
pub struct AuthService<U: UserRepository + ?Sized> {
    user_repository: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    /// Creates a new authentication service.
    pub fn new(
        user_repository: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            hasher,
            tokens,
            clock,
        }
    }

    /// Registers a new account and returns a token for it.
    ///
    /// A blank email is stored as absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the input fails the registration
    /// checks, [`AppError::Conflict`] if the username (or email) is taken,
    /// [`AppError::Internal`] on hashing or storage errors.
    pub async fn register(
        &self,
        username: String,
        password: String,
        email: Option<String>,
    ) -> Result<IssuedToken, AppError> {
        validate_registration(&username, &password, email.as_deref())?;

        if self
            .user_repository
            .find_by_username(&username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "Username is already taken",
                json!({ "username": username }),
            ));
        }

        let new_user = NewUser {
            username,
            email: email.filter(|e| !is_blank(e)),
            password_hash: self.hasher.hash(&password)?,
            created_at: self.clock.now(),
        };

        let user = self.user_repository.create(new_user).await?;
        let token = self.tokens.issue(&user.username)?;

        tracing::info!(username = %user.username, user_id = user.id, "User registered");

        Ok(IssuedToken {
            token,
            username: user.username,
        })
    }

    /// Checks credentials and returns a token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed input,
    /// [`AppError::Unauthorized`] for unknown users and wrong passwords alike.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        validate_login(username, password)?;

        let Some(user) = self.user_repository.find_by_username(username).await? else {
            tracing::warn!(username, "Login failed: unknown user");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.matches(password, &user.password_hash) {
            tracing::warn!(username, "Login failed: wrong password");
            return Err(AppError::invalid_credentials());
        }

        let token = self.tokens.issue(&user.username)?;
        tracing::info!(username, "User authenticated");

        Ok(IssuedToken {
            token,
            username: user.username,
        })
    }

    /// See [`TokenService::validate`].
    pub fn validate_token(&self, token: &str) -> bool {
        self.tokens.validate(token)
    }

    /// See [`TokenService::extract_username`].
    pub fn extract_username(&self, token: &str) -> Option<String> {
        self.tokens.extract_username(token)
    }

    /// Returns true if the user store answers queries.
    pub async fn storage_healthy(&self) -> bool {
        match self.user_repository.find_by_id(0).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "User store health check failed");
                false
            }
        }
    }
}
