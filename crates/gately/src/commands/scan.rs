//! One-shot code resolution: decode raw input and report the matching
//! definition without touching ticket state.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use gately_core::{CodeDefinition, ScannerConfig, resolve};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Resolution {
    code: String,
    matched: bool,
    definition: Option<String>,
    name: Option<String>,
    duration_minutes: Option<u32>,
    price: Option<u32>,
}

#[derive(Tabled)]
struct ResolutionRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "DEFINITION")]
    definition: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MINUTES")]
    minutes: String,
    #[tabled(rename = "PRICE")]
    price: String,
}

pub fn handle(args: &ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = gately_config::load_config_or_default();
    let definitions: Vec<Arc<CodeDefinition>> =
        util::load_definitions(args.definitions.as_deref(), &cfg)?
            .into_iter()
            .map(Arc::new)
            .collect();

    let scanner = ScannerConfig::default();
    let mut resolutions = Vec::with_capacity(args.codes.len());

    for raw in &args.codes {
        let code = util::normalize_code(raw, &scanner)?;
        let matched = resolve(&code, &definitions);
        resolutions.push(Resolution {
            code: code.to_string(),
            matched: matched.is_some(),
            definition: matched.map(|d| d.id.clone()),
            name: matched.map(|d| d.name.clone()),
            duration_minutes: matched.map(|d| d.duration_minutes),
            price: matched.map(|d| d.price),
        });
    }

    let rendered = output::render_list(&global.output, &resolutions, to_row, |r| r.code.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn to_row(r: &Resolution) -> ResolutionRow {
    let missing = || "-".to_owned();
    ResolutionRow {
        code: r.code.clone(),
        definition: r.definition.clone().unwrap_or_else(missing),
        name: r.name.clone().unwrap_or_else(missing),
        minutes: r.duration_minutes.map_or_else(missing, |m| m.to_string()),
        price: r.price.map_or_else(missing, |p| p.to_string()),
    }
}
