//! Short code generation and validation utilities.
//!
//! Generated codes are drawn uniformly from a configurable alphabet with a
//! cryptographically secure RNG. Caller-supplied codes are validated against
//! a fixed character set. Neither step guarantees uniqueness: that is checked
//! against the link store by [`crate::application::services::LinkService`].

use std::sync::{LazyLock, Mutex};

use rand::{Rng, SeedableRng, rngs::StdRng};
use regex::Regex;
use serde_json::json;

use crate::error::AppError;

/// Default alphabet: `a-z`, `A-Z`, `0-9`.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Maximum length of a caller-supplied code.
pub const MAX_CUSTOM_CODE_LENGTH: usize = 64;

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static regex"));

/// Random short code generator.
///
/// Owns its RNG so tests can inject a seeded one; production instances are
/// seeded from the operating system. `StdRng` is a CSPRNG.
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("alphabet_len", &self.alphabet.len())
            .field("length", &self.length)
            .finish()
    }
}

impl CodeGenerator {
    /// Creates a generator seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the alphabet or length is unusable,
    /// see [`Self::with_rng`].
    pub fn new(alphabet: &str, length: usize) -> Result<Self, AppError> {
        Self::with_rng(alphabet, length, StdRng::from_os_rng())
    }

    /// Creates a generator with the default alphabet and length.
    pub fn with_defaults() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_CODE_LENGTH,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a generator around an explicit RNG.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - `length` is zero or above [`MAX_CUSTOM_CODE_LENGTH`]
    /// - the alphabet has fewer than two distinct characters
    /// - the alphabet contains characters a custom code could not contain
    pub fn with_rng(alphabet: &str, length: usize, rng: StdRng) -> Result<Self, AppError> {
        if length == 0 || length > MAX_CUSTOM_CODE_LENGTH {
            return Err(AppError::bad_request(
                "Short code length must be between 1 and 64",
                json!({ "length": length }),
            ));
        }

        let mut chars: Vec<char> = alphabet.chars().collect();
        chars.sort_unstable();
        chars.dedup();

        if chars.len() < 2 {
            return Err(AppError::bad_request(
                "Short code alphabet needs at least two distinct characters",
                json!({ "alphabet": alphabet }),
            ));
        }

        if !CUSTOM_CODE_REGEX.is_match(alphabet) {
            return Err(AppError::bad_request(
                "Short code alphabet may only contain letters, digits, '_' or '-'",
                json!({ "alphabet": alphabet }),
            ));
        }

        Ok(Self {
            alphabet: chars,
            length,
            rng: Mutex::new(rng),
        })
    }

    /// Length of every generated code.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a random code.
    ///
    /// Each character is drawn independently and uniformly from the alphabet.
    /// The result is not checked for uniqueness.
    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}

/// Validates a caller-supplied short code.
///
/// # Rules
///
/// - Non-empty, at most 64 characters
/// - Only ASCII letters, digits, `_` and `-`
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("my_link-2024").is_ok());
/// assert!(validate_custom_code("bad@code").is_err());
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            "Custom code must be at most 64 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(AppError::bad_request(
            "Custom code may only contain letters, digits, '_' or '-'",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
