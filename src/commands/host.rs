//! Host command handlers: manage the allow-list.

use std::path::Path;

use alterego_core::PersonaRegistry;
use anyhow::Result;

use super::open_state_store;

pub async fn run_host_add_command(state_db: &Path, input: &str) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    let (host, added) = registry.add_allowed_host(input).await?;
    if added {
        println!("Allow-listed {host}");
    } else {
        println!("{host} is already allow-listed");
    }
    Ok(())
}

pub async fn run_host_remove_command(state_db: &Path, input: &str) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    if registry.remove_allowed_host(input).await? {
        println!("Removed {} from the allow-list", input.trim());
    } else {
        println!("{} is not allow-listed", input.trim());
    }
    Ok(())
}

pub async fn run_host_list_command(state_db: &Path) -> Result<()> {
    let registry = PersonaRegistry::new(open_state_store(state_db).await?);
    let hosts = registry.allowed_hosts().await?;
    if hosts.is_empty() {
        println!("No allow-listed hosts; persona switches leave all cookies alone.");
        return Ok(());
    }
    for host in hosts {
        println!("{host}");
    }
    Ok(())
}
