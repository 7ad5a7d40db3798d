//! Business logic services for the application layer.

pub mod auth_service;
pub mod link_service;
pub mod token_service;

pub use auth_service::{AuthService, IssuedToken};
pub use link_service::LinkService;
pub use token_service::{Claims, TokenService};
