//! Persona domain model.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named identity owning its own cookie snapshot for allow-listed hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Unique identifier (UUID format).
    pub id: String,
    /// Display name, unique case-insensitively.
    pub name: String,
    /// Creation time in epoch milliseconds.
    pub created: u64,
}

impl Persona {
    /// Creates a persona with a fresh id stamped with the current time.
    ///
    /// The name is taken as given; use
    /// [`validate_persona_name`](super::validate_persona_name) first.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created: now_millis(),
        }
    }

    /// Returns `true` when `needle` is this persona's id or, ignoring case, its name.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.id == needle || self.name.to_lowercase() == needle.trim().to_lowercase()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
