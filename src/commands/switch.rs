//! Use command handler: switch the active persona against a cookie jar file.

use std::sync::Arc;

use alterego_core::{
    BrowserAgent, JarFileBrowser, Persona, PersonaRegistry, PersonaSwitchCoordinator, RegistryError,
    StateStore, SwitchDispatcher, SwitchOutcome,
};
use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use super::open_state_store;
use crate::app_config::StatePaths;
use crate::cli::UseArgs;

pub async fn run_use_command(args: &UseArgs, paths: &StatePaths) -> Result<()> {
    let store: Arc<dyn StateStore> = open_state_store(&paths.state_db).await?;
    let jar = Arc::new(
        JarFileBrowser::open(&paths.browser_jar, args.tab_url.as_deref()).with_context(|| {
            format!(
                "Failed to load cookie jar '{}'",
                paths.browser_jar.display()
            )
        })?,
    );

    let browser: Arc<dyn BrowserAgent> = jar.clone();
    let coordinator = Arc::new(PersonaSwitchCoordinator::new(Arc::clone(&store), browser));
    let dispatcher = SwitchDispatcher::spawn(Arc::clone(&coordinator));
    let mut completions = dispatcher.subscribe();
    let registry = PersonaRegistry::new(Arc::clone(&store))
        .with_gate(coordinator.gate())
        .with_switch_notifier(dispatcher.notifier());

    let target = match args.persona.as_deref() {
        Some(needle) => Some(
            registry
                .find_persona(needle)
                .await?
                .ok_or_else(|| RegistryError::PersonaNotFound(needle.to_string()))?,
        ),
        None => None,
    };

    let event = registry
        .select_persona(target.as_ref().map(|persona| persona.id.as_str()))
        .await?;
    dispatcher.shutdown().await;

    let label = persona_label(target.as_ref());
    if event.is_none() {
        println!("{label} is already active; nothing to switch");
        return Ok(());
    }

    let completion = completions
        .recv()
        .await
        .context("Persona switch finished without reporting an outcome")?;
    let outcome = completion
        .outcome
        .map_err(|message| anyhow!("Active persona is now {label}, but {message}"))?;

    match outcome {
        SwitchOutcome::Skipped(reason) => {
            println!("Active persona is now {label}; cookies left untouched ({reason})");
        }
        SwitchOutcome::Completed(report) => {
            jar.persist().await.with_context(|| {
                format!(
                    "Failed to save cookie jar '{}'",
                    paths.browser_jar.display()
                )
            })?;

            for failure in &report.failures {
                warn!(
                    name = %failure.name,
                    host = %failure.host,
                    error = %failure.error,
                    "cookie was not restored"
                );
            }
            info!(jar = %jar.path().display(), "saved cookie jar");

            let saved = report
                .saved
                .map_or_else(|| "no outgoing persona".to_string(), |n| format!("saved {n}"));
            println!(
                "Active persona is now {label} on {}: {saved}, restored {}, failed {}",
                report.host,
                report.restored,
                report.failures.len()
            );
        }
    }

    Ok(())
}

fn persona_label(persona: Option<&Persona>) -> String {
    persona.map_or_else(|| "<none>".to_string(), |persona| format!("'{}'", persona.name))
}
