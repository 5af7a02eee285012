//! Config subcommand handlers.

use std::collections::HashMap;

use gately_config::{Config, Defaults, TerminalProfile, config_path, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match &args.command {
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init { force } => init(*force, global),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = gately_config::load_config_or_default();
    let rendered = toml::to_string_pretty(&cfg)?;
    output::print_output(rendered.trim_end(), global.quiet);
    Ok(())
}

/// Write a starter config: one ENTRY terminal with a local relay box.
fn init(force: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config_path();
    if path.exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.display().to_string(),
        });
    }

    let cfg = Config {
        default_terminal: Some("entry-1".into()),
        defaults: Defaults {
            definitions: Some(path.with_file_name("definitions.toml")),
            ..Defaults::default()
        },
        terminals: HashMap::from([(
            "entry-1".into(),
            TerminalProfile {
                mode: "entry".into(),
                location: Some("main gate".into()),
                relay_endpoint: Some("http://localhost:3001".into()),
                relay_enabled: true,
                relay_timeout_secs: None,
                door_pulse_secs: None,
                utc_offset_minutes: None,
                scanner: None,
            },
        )]),
    };

    save_config(&cfg)?;
    output::print_output(
        &format!("Wrote starter config to {}", path.display()),
        global.quiet,
    );
    Ok(())
}
