//! Shared configuration for the gately terminal binary.
//!
//! TOML terminal profiles, code definition files, and translation to
//! `gately_core::GateConfig` / `gately_relay::Relay`. Core never sees
//! these types -- it receives pre-built configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gately_core::{CodeDefinition, GateConfig, ScanKind, ScannerConfig};
use gately_relay::{HttpRelay, Relay};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no terminal named '{name}' in the config")]
    UnknownTerminal { name: String },

    #[error("no terminal selected: pass --terminal or set default_terminal")]
    NoTerminal,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse {path}: {source}")]
    Definitions {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("relay endpoint rejected: {0}")]
    Relay(#[from] gately_relay::RelayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration for a gately installation.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Terminal profile used when --terminal is not specified.
    pub default_terminal: Option<String>,

    /// Venue-wide defaults, overridable per terminal.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named terminal profiles ("entry-1", "check-1", ...).
    #[serde(default)]
    pub terminals: HashMap<String, TerminalProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Path to the code definitions TOML file.
    pub definitions: Option<PathBuf>,

    /// Venue UTC offset in minutes (e.g. 120 for UTC+2). Unset means
    /// the host's local offset.
    pub utc_offset_minutes: Option<i32>,

    /// Seconds the door relay is held open per admission.
    #[serde(default = "default_door_pulse")]
    pub door_pulse_secs: u64,

    /// Admission events retained in memory for `gately events`.
    #[serde(default = "default_event_retention")]
    pub event_retention: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            definitions: None,
            utc_offset_minutes: None,
            door_pulse_secs: default_door_pulse(),
            event_retention: default_event_retention(),
        }
    }
}

fn default_door_pulse() -> u64 {
    5
}
fn default_event_retention() -> usize {
    256
}

/// A named terminal profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct TerminalProfile {
    /// Operation this terminal performs: "entry", "check", or "exit".
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Free-form placement note ("main gate", "pool side").
    pub location: Option<String>,

    /// Door relay endpoint base URL (e.g. "http://localhost:3001").
    /// Unset means no door hardware (typical for CHECK terminals).
    pub relay_endpoint: Option<String>,

    /// Disable the relay without removing the endpoint from the file.
    #[serde(default = "default_true")]
    pub relay_enabled: bool,

    /// Per-request relay timeout override.
    pub relay_timeout_secs: Option<u64>,

    /// Override the venue-wide door pulse length.
    pub door_pulse_secs: Option<u64>,

    /// Override the venue-wide UTC offset.
    pub utc_offset_minutes: Option<i32>,

    /// Reader tuning for this terminal; unset uses the decoder defaults.
    pub scanner: Option<ScannerConfig>,
}

fn default_mode() -> String {
    "entry".into()
}
fn default_true() -> bool {
    true
}

impl TerminalProfile {
    /// Parse the profile's `mode` field.
    pub fn scan_kind(&self) -> Result<ScanKind, ConfigError> {
        match self.mode.as_str() {
            "entry" => Ok(ScanKind::Entry),
            "check" => Ok(ScanKind::Check),
            "exit" => Ok(ScanKind::Exit),
            other => Err(ConfigError::Validation {
                field: "mode".into(),
                reason: format!("expected 'entry', 'check', or 'exit', got '{other}'"),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `GATELY_CONFIG` env override first,
/// then XDG / platform conventions.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("GATELY_CONFIG") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "gately", "gately").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gately");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from an explicit path, still honoring `GATELY_*`
/// environment overrides.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GATELY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Code definition files ───────────────────────────────────────────

/// On-disk shape of a definitions file: a sequence of `[[definition]]`
/// tables.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DefinitionsFile {
    #[serde(default)]
    pub definition: Vec<CodeDefinition>,
}

/// Load code definitions from a TOML file. Order in the file is the
/// resolution precedence for overlapping selectors.
pub fn load_definitions(path: &Path) -> Result<Vec<CodeDefinition>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let file: DefinitionsFile = toml::from_str(&raw).map_err(|source| ConfigError::Definitions {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.definition)
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick a terminal profile by name, falling back to `default_terminal`.
pub fn select_terminal<'a>(
    config: &'a Config,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a TerminalProfile), ConfigError> {
    let name = name
        .or(config.default_terminal.as_deref())
        .ok_or(ConfigError::NoTerminal)?;
    let profile = config
        .terminals
        .get(name)
        .ok_or_else(|| ConfigError::UnknownTerminal { name: name.into() })?;
    Ok((name, profile))
}

/// Build a `GateConfig` from a terminal profile plus venue defaults.
pub fn profile_to_gate_config(
    name: &str,
    profile: &TerminalProfile,
    defaults: &Defaults,
) -> Result<GateConfig, ConfigError> {
    let mut config = GateConfig::new(name);

    if let Some(scanner) = &profile.scanner {
        config.scanner = scanner.clone();
    }
    if let Some(minutes) = profile.utc_offset_minutes.or(defaults.utc_offset_minutes) {
        config.day_offset = offset_from_minutes(minutes)?;
    }
    config.door_pulse =
        Duration::from_secs(profile.door_pulse_secs.unwrap_or(defaults.door_pulse_secs));
    config.event_retention = defaults.event_retention;

    Ok(config)
}

/// Build the door relay for a terminal profile. No endpoint (or an
/// explicit disable) yields `Relay::Disabled`.
pub fn profile_relay(profile: &TerminalProfile) -> Result<Relay, ConfigError> {
    if !profile.relay_enabled {
        return Ok(Relay::Disabled);
    }
    let Some(endpoint) = &profile.relay_endpoint else {
        return Ok(Relay::Disabled);
    };

    let relay = match profile.relay_timeout_secs {
        Some(secs) => HttpRelay::with_timeout(endpoint, Duration::from_secs(secs))?,
        None => HttpRelay::new(endpoint)?,
    };
    Ok(Relay::Http(relay))
}

fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    FixedOffset::east_opt(minutes * 60).ok_or_else(|| ConfigError::Validation {
        field: "utc_offset_minutes".into(),
        reason: format!("offset {minutes} minutes is out of range"),
    })
}
