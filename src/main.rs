//! CLI entry point for the alterego tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;

use app_config::{LoadedConfig, StatePaths, VerbositySetting, load_default_file_config};
use cli::{Args, Command, HostCommand, PersonaCommand};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let loaded_config = load_default_file_config()?;

    init_tracing(&args, &loaded_config);
    debug!(?args, "CLI arguments parsed");
    if let Some(path) = &loaded_config.path
        && loaded_config.config.is_some()
    {
        debug!(path = %path.display(), "loaded config file");
    }

    let jar_flag = match &args.command {
        Command::Use(use_args) => use_args.jar.as_deref(),
        _ => None,
    };
    let paths = StatePaths::resolve(args.state_db.as_deref(), jar_flag, &loaded_config)?;
    debug!(state_db = %paths.state_db.display(), browser_jar = %paths.browser_jar.display(), "resolved state paths");

    match &args.command {
        Command::Persona { command } => match command {
            PersonaCommand::Add { name } => {
                commands::run_persona_add_command(&paths.state_db, name).await?;
            }
            PersonaCommand::List => commands::run_persona_list_command(&paths.state_db).await?,
            PersonaCommand::Remove { persona } => {
                commands::run_persona_remove_command(&paths.state_db, persona).await?;
            }
        },
        Command::Host { command } => match command {
            HostCommand::Add { host } => commands::run_host_add_command(&paths.state_db, host).await?,
            HostCommand::Remove { host } => {
                commands::run_host_remove_command(&paths.state_db, host).await?;
            }
            HostCommand::List => commands::run_host_list_command(&paths.state_db).await?,
        },
        Command::Use(use_args) => commands::run_use_command(use_args, &paths).await?,
        Command::Status => commands::run_status_command(&paths).await?,
    }

    Ok(())
}

/// Installs the stderr subscriber.
///
/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > config verbosity > info.
fn init_tracing(args: &Args, loaded_config: &LoadedConfig) {
    let configured = loaded_config
        .config
        .as_ref()
        .and_then(|config| config.verbosity)
        .unwrap_or(VerbositySetting::Default);

    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => configured.default_level(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .init();
}
