//! Application layer services implementing business logic.
//!
//! Services consume the repository traits from [`crate::domain`] and give the
//! HTTP handlers one API for every operation.
//!
//! # Available Services
//!
//! - [`services::auth_service::AuthService`] - Registration and login
//! - [`services::link_service::LinkService`] - Short link lifecycle and redirects
//! - [`services::token_service::TokenService`] - Signed bearer tokens
//!
//! Input rules shared by the services live in [`validation`].

pub mod services;
pub mod validation;
