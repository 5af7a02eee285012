//! Definitions subcommand handlers.

use std::sync::Arc;

use tabled::Tabled;

use gately_core::{CodeDefinition, ScannerConfig, resolve};

use crate::cli::{DefinitionsArgs, DefinitionsCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct DefinitionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SELECTOR")]
    selector: String,
    #[tabled(rename = "MINUTES")]
    minutes: u32,
    #[tabled(rename = "PRICE")]
    price: u32,
    #[tabled(rename = "RATE/MIN")]
    rate: u32,
    #[tabled(rename = "ACTIVE")]
    active: bool,
}

pub fn handle(args: &DefinitionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = gately_config::load_config_or_default();
    let definitions = util::load_definitions(args.definitions.as_deref(), &cfg)?;

    match &args.command {
        DefinitionsCommand::List => list(&definitions, global),
        DefinitionsCommand::Check { code } => check(&definitions, code, global),
    }
}

fn list(definitions: &[CodeDefinition], global: &GlobalOpts) -> Result<(), CliError> {
    let rendered = output::render_list(&global.output, definitions, to_row, |d| d.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn check(definitions: &[CodeDefinition], raw: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let code = util::normalize_code(raw, &ScannerConfig::default())?;
    let definitions: Vec<Arc<CodeDefinition>> =
        definitions.iter().cloned().map(Arc::new).collect();

    let Some(matched) = resolve(&code, &definitions) else {
        return Err(CliError::UnmatchedCode {
            code: code.to_string(),
        });
    };

    let rendered = output::render_single(
        &global.output,
        matched.as_ref(),
        |d| detail(&code.to_string(), d),
        |d| d.id.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn to_row(d: &CodeDefinition) -> DefinitionRow {
    DefinitionRow {
        id: d.id.clone(),
        name: d.name.clone(),
        selector: d.selector.to_string(),
        minutes: d.duration_minutes,
        price: d.price,
        rate: d.price_per_extra_minute,
        active: d.active,
    }
}

fn detail(code: &str, d: &CodeDefinition) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    let _ = writeln!(out, "code:      {code}");
    let _ = writeln!(out, "id:        {}", d.id);
    let _ = writeln!(out, "name:      {}", d.name);
    if let Some(description) = &d.description {
        let _ = writeln!(out, "about:     {description}");
    }
    let _ = writeln!(out, "selector:  {}", d.selector);
    let _ = writeln!(out, "minutes:   {}", d.duration_minutes);
    let _ = writeln!(out, "price:     {}", d.price);
    let _ = write!(out, "rate/min:  {}", d.price_per_extra_minute);
    out
}
