//! Clap derive structures for the `gately` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// gately -- access-control terminal for barcode-ticketed venues
#[derive(Debug, Parser)]
#[command(
    name = "gately",
    version,
    about = "Run barcode access terminals from the command line",
    long_about = "Drives one access-control terminal: decodes keyboard-wedge\n\
        barcode reader input, resolves codes against the venue's priced\n\
        definitions, and applies the ENTRY/CHECK/EXIT ticket lifecycle.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Terminal profile to use
    #[arg(long, short = 't', env = "GATELY_TERMINAL", global = true)]
    pub terminal: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "GATELY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the terminal kiosk loop (reads scans from stdin)
    #[command(alias = "r")]
    Run(RunArgs),

    /// Decode and resolve raw codes without touching ticket state
    Scan(ScanArgs),

    /// Inspect the venue's code definitions
    #[command(alias = "defs")]
    Definitions(DefinitionsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Code definitions file (overrides defaults.definitions)
    #[arg(long)]
    pub definitions: Option<PathBuf>,
}

// ── Scan ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Raw codes as the reader would type them
    #[arg(required = true)]
    pub codes: Vec<String>,

    /// Code definitions file (overrides defaults.definitions)
    #[arg(long)]
    pub definitions: Option<PathBuf>,
}

// ── Definitions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DefinitionsArgs {
    #[command(subcommand)]
    pub command: DefinitionsCommand,

    /// Code definitions file (overrides defaults.definitions)
    #[arg(long, global = true)]
    pub definitions: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum DefinitionsCommand {
    /// List all definitions in resolution order
    #[command(alias = "ls")]
    List,

    /// Show which definition claims a code
    Check {
        /// Scan code (leading zeros significant)
        code: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
