//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const APP_DIR: &str = "alterego";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_STATE_DB: &str = "state.db";
const DEFAULT_BROWSER_JAR: &str = "cookies.json";

/// TOML-style file configuration for alterego defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// `SQLite` file holding personas, the allow-list and cookie snapshots.
    pub state_db: Option<PathBuf>,
    /// JSON cookie jar the `use` command switches.
    pub browser_jar: Option<PathBuf>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the tracing filter used when no CLI flag or `RUST_LOG` applies.
    #[must_use]
    pub fn default_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
            Self::Quiet => "error",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// Directory holding the config file, also the default home for state.
    #[must_use]
    pub fn app_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }
}

/// State file locations after applying CLI overrides and config defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub state_db: PathBuf,
    pub browser_jar: PathBuf,
}

impl StatePaths {
    /// Resolves state paths.
    ///
    /// Priority: CLI flag, then config file, then a file next to the config.
    pub fn resolve(
        state_db_flag: Option<&Path>,
        jar_flag: Option<&Path>,
        loaded: &LoadedConfig,
    ) -> Result<Self> {
        let file_config = loaded.config.as_ref();
        let app_dir = loaded.app_dir();

        let state_db = pick_path(
            state_db_flag,
            file_config.and_then(|cfg| cfg.state_db.as_deref()),
            app_dir,
            DEFAULT_STATE_DB,
        )
        .context("Cannot resolve the state database path; pass --state-db or set HOME")?;
        let browser_jar = pick_path(
            jar_flag,
            file_config.and_then(|cfg| cfg.browser_jar.as_deref()),
            app_dir,
            DEFAULT_BROWSER_JAR,
        )
        .context("Cannot resolve the cookie jar path; pass --jar or set HOME")?;

        Ok(Self {
            state_db,
            browser_jar,
        })
    }
}

fn pick_path(
    flag: Option<&Path>,
    configured: Option<&Path>,
    app_dir: Option<&Path>,
    file_name: &str,
) -> Option<PathBuf> {
    flag.or(configured)
        .map(Path::to_path_buf)
        .or_else(|| app_dir.map(|dir| dir.join(file_name)))
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/alterego/config.toml`
/// 2. `$HOME/.config/alterego/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join(CONFIG_FILE));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILE),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "state_db" => {
                let parsed = parse_path_literal(value).with_context(|| {
                    format!("Invalid `state_db` value on line {line_number}")
                })?;
                cfg.state_db = Some(parsed);
            }
            "browser_jar" => {
                let parsed = parse_path_literal(value).with_context(|| {
                    format!("Invalid `browser_jar` value on line {line_number}")
                })?;
                cfg.browser_jar = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `verbosity` value on line {line_number}")
                })?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_path_literal(raw_value: &str) -> Result<PathBuf> {
    let parsed = parse_string_literal(raw_value)?;
    if parsed.trim().is_empty() {
        bail!("Expected a non-empty path");
    }
    Ok(PathBuf::from(parsed))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
