//! Persona name validation.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::model::Persona;

/// Minimum persona name length in characters, after trimming.
pub const MIN_NAME_LENGTH: usize = 1;

/// Maximum persona name length in characters, after trimming.
pub const MAX_NAME_LENGTH: usize = 50;

/// Letters, digits, whitespace, hyphens and underscores.
#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\s\-_]+$").expect("persona name regex is valid") // Static pattern, safe to panic
});

/// Reasons a persona name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonaNameError {
    /// Name is blank after trimming.
    #[error("Persona name cannot be empty")]
    Empty,
    /// Name is longer than [`MAX_NAME_LENGTH`].
    #[error("Persona name must not exceed {max} characters")]
    TooLong {
        /// The configured maximum.
        max: usize,
    },
    /// Name contains characters outside the allowed set.
    #[error("Persona name can only contain letters, numbers, spaces, hyphens, and underscores")]
    InvalidCharacters,
    /// Another persona already uses this name (ignoring case).
    #[error("A persona named '{name}' already exists")]
    Duplicate {
        /// The conflicting name.
        name: String,
    },
}

/// Validates a new persona name against the existing personas.
///
/// Returns the trimmed name on success.
///
/// # Errors
///
/// Returns [`PersonaNameError`] describing the first rule the name breaks.
pub fn validate_persona_name(name: &str, existing: &[Persona]) -> Result<String, PersonaNameError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if length < MIN_NAME_LENGTH {
        return Err(PersonaNameError::Empty);
    }
    if length > MAX_NAME_LENGTH {
        return Err(PersonaNameError::TooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    if !NAME_PATTERN.is_match(trimmed) {
        return Err(PersonaNameError::InvalidCharacters);
    }

    let lowered = trimmed.to_lowercase();
    if let Some(conflict) = existing
        .iter()
        .find(|persona| persona.name.to_lowercase() == lowered)
    {
        return Err(PersonaNameError::Duplicate {
            name: conflict.name.clone(),
        });
    }

    Ok(trimmed.to_string())
}
