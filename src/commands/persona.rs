//! Persona command handlers: add, list and remove personas.

use std::path::Path;

use alterego_core::{PersonaRegistry, RegistryError};
use anyhow::Result;

use super::open_state_store;

pub async fn run_persona_add_command(state_db: &Path, name: &str) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    let persona = registry.create_persona(name).await?;
    println!("Created persona '{}' ({})", persona.name, persona.id);
    Ok(())
}

pub async fn run_persona_list_command(state_db: &Path) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    let personas = registry.list_personas().await?;
    if personas.is_empty() {
        println!("No personas yet. Create one with `alterego persona add <name>`.");
        return Ok(());
    }

    let active_id = registry.active_persona().await?.map(|persona| persona.id);
    for persona in &personas {
        let marker = if active_id.as_deref() == Some(persona.id.as_str()) {
            '*'
        } else {
            ' '
        };
        println!("{marker} {}\t{}", persona.name, persona.id);
    }
    Ok(())
}

pub async fn run_persona_remove_command(state_db: &Path, needle: &str) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    let persona = registry
        .find_persona(needle)
        .await?
        .ok_or_else(|| RegistryError::PersonaNotFound(needle.to_string()))?;

    let removed = registry.delete_persona(&persona.id).await?;
    println!("Deleted persona '{}' and its stored cookies", removed.name);
    Ok(())
}
