//! Domain layer: entities and repository contracts.
//!
//! The domain layer has no dependency on HTTP or storage code. Business
//! rules live in [`crate::application::services`]; storage lives in
//! [`crate::infrastructure`].
//!
//! - [`entities`] - `User` and `Link`
//! - [`repositories`] - Storage traits consumed by the services

pub mod entities;
pub mod repositories;
