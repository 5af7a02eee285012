//! Shared helpers for command handlers.

use std::path::{Path, PathBuf};

use chrono::Utc;

use gately_config::Config;
use gately_core::{CodeDefinition, KeyEvent, ScanCode, ScanDecoder, ScanOutcome, ScannerConfig};

use crate::error::CliError;

/// Resolve the definitions file path: CLI flag first, then the config's
/// `defaults.definitions`.
pub fn definitions_path(flag: Option<&Path>, config: &Config) -> Result<PathBuf, CliError> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.defaults.definitions.clone())
        .ok_or(CliError::NoDefinitions)
}

/// Load definitions from the flag-or-config path.
pub fn load_definitions(
    flag: Option<&Path>,
    config: &Config,
) -> Result<Vec<CodeDefinition>, CliError> {
    let path = definitions_path(flag, config)?;
    Ok(gately_config::load_definitions(&path)?)
}

/// Run one raw code through the scan decoder, as if a reader typed it.
/// Applies the same normalization the kiosk loop would (leading-zero
/// padding, length validation).
pub fn normalize_code(raw: &str, scanner: &ScannerConfig) -> Result<ScanCode, CliError> {
    let mut decoder = ScanDecoder::new(scanner.clone());
    let now = Utc::now();
    for ch in raw.trim().chars() {
        decoder.push(KeyEvent::new(ch, now));
    }
    match decoder.flush(now) {
        ScanOutcome::Accepted(code) => Ok(code),
        outcome => Err(CliError::Validation {
            field: "code".into(),
            reason: format!("'{raw}' would not be accepted by the reader ({outcome:?})"),
        }),
    }
}
