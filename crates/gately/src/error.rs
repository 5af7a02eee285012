//! CLI error types with miette diagnostics.
//!
//! Maps engine and configuration faults into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gately_config::ConfigError;
use gately_core::CoreError;

/// Exit codes for scripting.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Terminal selection ───────────────────────────────────────────

    #[error("No terminal selected")]
    #[diagnostic(
        code(gately::no_terminal),
        help(
            "Pass --terminal (-t), set GATELY_TERMINAL, or set\n\
             default_terminal in the config file."
        )
    )]
    NoTerminal,

    #[error("Terminal '{name}' not found in configuration")]
    #[diagnostic(
        code(gately::terminal_not_found),
        help("Available terminals: {available}\nAdd one with: gately config init")
    )]
    TerminalNotFound { name: String, available: String },

    // ── Definitions ──────────────────────────────────────────────────

    #[error("No code definitions configured")]
    #[diagnostic(
        code(gately::no_definitions),
        help("Set defaults.definitions in the config file or pass --definitions.")
    )]
    NoDefinitions,

    #[error("No definition claims code '{code}'")]
    #[diagnostic(
        code(gately::unmatched_code),
        help("Run: gately definitions list to see the configured selectors.")
    )]
    UnmatchedCode { code: String },

    // ── Engine ───────────────────────────────────────────────────────

    #[error("Ticket '{code}' is being updated by another terminal")]
    #[diagnostic(code(gately::contention), help("Re-scan the code."))]
    Contention { code: String },

    #[error("Ticket store rejected the update: {message}")]
    #[diagnostic(code(gately::store))]
    StoreRejected { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gately::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(gately::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(gately::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(gately::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(gately::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoTerminal | Self::NoDefinitions | Self::Validation { .. } => exit_code::USAGE,
            Self::TerminalNotFound { .. } | Self::UnmatchedCode { .. } => exit_code::NOT_FOUND,
            Self::Contention { .. } | Self::StoreRejected { .. } | Self::ConfigExists { .. } => {
                exit_code::CONFLICT
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoTerminal => Self::NoTerminal,
            ConfigError::UnknownTerminal { name } => Self::TerminalNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CommitContention { code, .. } => Self::Contention { code },
            CoreError::Store(inner) => Self::StoreRejected {
                message: inner.to_string(),
            },
        }
    }
}
