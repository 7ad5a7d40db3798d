//! Data Transfer Objects for API requests and responses.
//!
//! Request fields default to empty values; the services validate them.

pub mod auth;
pub mod health;
pub mod link;
