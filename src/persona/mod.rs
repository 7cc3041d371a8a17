//! Personas and their management.
//!
//! - `model`: the [`Persona`] record
//! - `name`: persona name rules
//! - `registry`: [`PersonaRegistry`], the single writer of persona and
//!   allow-list configuration

mod model;
mod name;
mod registry;

pub use model::Persona;
pub use name::{MAX_NAME_LENGTH, MIN_NAME_LENGTH, PersonaNameError, validate_persona_name};
pub use registry::{PersonaRegistry, RegistryError};
