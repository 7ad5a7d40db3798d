//! Shared application state injected into all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::services::{AuthService, LinkService, TokenService};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::code_generator::CodeGenerator;
use crate::utils::password::Argon2Hasher;

/// Services shared across requests.
///
/// Repositories are held as trait objects so the same router runs on top of
/// PostgreSQL or the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<dyn UserRepository>>,
    pub link_service: Arc<LinkService<dyn LinkRepository, dyn UserRepository>>,
}

impl AppState {
    /// Wires the services on top of the given repositories.
    ///
    /// # Errors
    ///
    /// Fails if the token or short-code settings in `config` are unusable.
    pub fn new(
        users: Arc<dyn UserRepository>,
        links: Arc<dyn LinkRepository>,
        config: &Config,
    ) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::with_clock(users, links, config, clock)
    }

    /// Same as [`Self::new`] with an explicit clock.
    pub fn with_clock(
        users: Arc<dyn UserRepository>,
        links: Arc<dyn LinkRepository>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let tokens = Arc::new(
            TokenService::new(&config.jwt_secret, config.token_lifetime(), clock.clone())
                .context("Invalid token settings")?,
        );

        let generator = Arc::new(
            CodeGenerator::new(&config.short_code_alphabet, config.short_code_length)
                .context("Invalid short code settings")?,
        );

        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(Argon2Hasher::new()),
            tokens,
            clock.clone(),
        ));

        let link_service = Arc::new(LinkService::new(
            links,
            users,
            generator,
            clock,
            config.base_url.clone(),
        ));

        Ok(Self {
            auth_service,
            link_service,
        })
    }
}
