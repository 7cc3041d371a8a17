//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Per-site cookie isolation between browser personas.
///
/// `AlterEgo` keeps one cookie snapshot per persona and swaps the cookies of
/// allow-listed sites whenever the active persona changes.
#[derive(Parser, Debug)]
#[command(name = "alterego")]
#[command(author, version, about)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// State database path (overrides `state_db` from the config file)
    #[arg(long, value_name = "PATH", global = true)]
    pub state_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, list and delete personas
    Persona {
        #[command(subcommand)]
        command: PersonaCommand,
    },
    /// Manage the hosts whose cookies are isolated per persona
    Host {
        #[command(subcommand)]
        command: HostCommand,
    },
    /// Switch the active persona for the tab's site
    Use(UseArgs),
    /// Show the active persona and the allow-listed hosts
    Status,
}

#[derive(Subcommand, Debug)]
pub enum PersonaCommand {
    /// Create a persona
    Add {
        /// Persona name (letters, digits, spaces, '-' and '_'; up to 50 characters)
        name: String,
    },
    /// List personas in creation order
    List,
    /// Delete a persona and its stored cookies
    Remove {
        /// Persona name or id
        persona: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// Allow-list a host (bare hostname or http/https URL)
    Add { host: String },
    /// Remove a host from the allow-list
    Remove { host: String },
    /// List allow-listed hosts
    List,
}

#[derive(clap::Args, Debug)]
pub struct UseArgs {
    /// Persona name or id to activate
    #[arg(required_unless_present = "none", conflicts_with = "none")]
    pub persona: Option<String>,

    /// Deactivate the current persona without activating another
    #[arg(long)]
    pub none: bool,

    /// URL of the active tab (omit when no tab is focused)
    #[arg(long, value_name = "URL")]
    pub tab_url: Option<String>,

    /// Cookie jar file (overrides `browser_jar` from the config file)
    #[arg(long, value_name = "PATH")]
    pub jar: Option<PathBuf>,
}
