//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are bound at runtime and mapped through `FromRow` structs.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Account storage
//! - [`PgLinkRepository`] - Link storage, redirect counters

pub mod pg_link_repository;
pub mod pg_user_repository;

pub use pg_link_repository::PgLinkRepository;
pub use pg_user_repository::PgUserRepository;
