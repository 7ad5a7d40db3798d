//! Core domain entities.
//!
//! Entities are plain data structures. Each has a companion `New*` struct
//! carrying only the fields supplied at creation; identifiers and
//! store-managed columns are filled in by the repository.
//!
//! - [`User`] - A registered account
//! - [`Link`] - A short code mapped to an original URL, owned by one user

pub mod link;
pub mod user;

pub use link::{Link, NewLink};
pub use user::{NewUser, User};
