//! Status command handler: show the active persona and allow-list.

use alterego_core::PersonaRegistry;
use anyhow::Result;

use super::open_state_store;
use crate::app_config::StatePaths;

pub async fn run_status_command(paths: &StatePaths) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(&paths.state_db).await?);
    let active = registry.active_persona().await?;
    let personas = registry.list_personas().await?;
    let hosts = registry.allowed_hosts().await?;

    println!("state_db = {}", paths.state_db.display());
    println!("browser_jar = {}", paths.browser_jar.display());
    println!(
        "active_persona = {}",
        active.map_or_else(|| "<none>".to_string(), |persona| persona.name)
    );
    println!("personas = {}", personas.len());
    println!(
        "allowed_hosts = {}",
        if hosts.is_empty() {
            "<none>".to_string()
        } else {
            hosts.join(", ")
        }
    );
    Ok(())
}
