//! Utility building blocks shared across layers.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`password`] - Argon2 password hashing
//! - [`clock`] - Injectable time source
//! - [`db_error`] - Constraint violation helpers

pub mod clock;
pub mod code_generator;
pub mod db_error;
pub mod password;
