//! The kiosk loop: one terminal, one reader, one operation.
//!
//! Reads keyboard-wedge reader input from stdin line by line, feeds it
//! through the scan decoder, and applies the terminal's configured
//! operation (ENTRY, CHECK, or EXIT) to each accepted code.

use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use gately_config as config;
use gately_core::{
    AdmissionDecision, CheckOutcome, EntryOutcome, ExitOutcome, Gate, KeyEvent, ScanDecoder,
    ScanKind, ScanOutcome, ScanReject,
};

use crate::cli::{GlobalOpts, RunArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    let (name, profile) = config::select_terminal(&cfg, global.terminal.as_deref())
        .map_err(|err| annotate_terminal_error(err, &cfg))?;
    let kind = profile.scan_kind()?;

    let gate_config = config::profile_to_gate_config(name, profile, &cfg.defaults)?;
    let relay = config::profile_relay(profile)?;
    let scanner = gate_config.scanner.clone();

    let definitions = util::load_definitions(args.definitions.as_deref(), &cfg)?;
    let gate = Gate::new(gate_config, relay);
    let loaded = gate.load_definitions(definitions);

    tracing::info!(terminal = %name, mode = %kind, definitions = loaded, "terminal ready");
    if !global.quiet {
        println!("{name} [{kind}] ready, {loaded} definitions loaded. Scan a code.");
    }

    kiosk_loop(&gate, kind, scanner, global).await
}

/// Attach the list of configured terminals to a selection failure.
fn annotate_terminal_error(err: config::ConfigError, cfg: &config::Config) -> CliError {
    match CliError::from(err) {
        CliError::TerminalNotFound { name, .. } => {
            let mut names: Vec<_> = cfg.terminals.keys().cloned().collect();
            names.sort();
            CliError::TerminalNotFound {
                name,
                available: names.join(", "),
            }
        }
        other => other,
    }
}

async fn kiosk_loop(
    gate: &Gate,
    kind: ScanKind,
    scanner: gately_core::ScannerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let colored = output::should_color(&global.color);
    let mut decoder = ScanDecoder::new(scanner);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let now = Utc::now();
        for ch in line.chars() {
            decoder.push(KeyEvent::new(ch, now));
        }

        match decoder.push(KeyEvent::new('\n', now)) {
            ScanOutcome::Pending => {}
            ScanOutcome::Rejected(reject) => report(&describe_reject(reject), false, colored, global),
            ScanOutcome::Accepted(code) => {
                let decision = gate.admit(&code, kind, now).await?;
                let (admitted, message) = describe_decision(&decision);
                report(&format!("{code}: {message}"), admitted, colored, global);
            }
        }
    }

    Ok(())
}

fn report(message: &str, admitted: bool, colored: bool, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    if colored {
        if admitted {
            println!("{}", message.green());
        } else {
            println!("{}", message.red());
        }
    } else {
        println!("{message}");
    }
}

fn describe_reject(reject: ScanReject) -> String {
    match reject {
        ScanReject::InvalidFormat { length } => {
            format!("rejected: {length} digits is not a valid code")
        }
        ScanReject::Debounced => "rejected: duplicate scan".into(),
    }
}

/// One human-readable line per decision, plus whether it admitted.
fn describe_decision(decision: &AdmissionDecision) -> (bool, String) {
    match decision {
        AdmissionDecision::Entry(outcome) => match outcome {
            EntryOutcome::Admitted { ticket, .. } => (
                true,
                format!("admitted, {} min (door open)", ticket.remaining_minutes),
            ),
            EntryOutcome::UnknownCode => (false, "unknown code".into()),
            EntryOutcome::Expired => (false, "ticket expired".into()),
            EntryOutcome::AlreadyInside => (false, "already inside".into()),
            EntryOutcome::TimeExhausted => (false, "no time left, new ticket required".into()),
        },
        AdmissionDecision::Check(outcome) => match outcome {
            CheckOutcome::Inside {
                remaining_minutes,
                overstay_minutes,
                ..
            } => {
                if *overstay_minutes > 0 {
                    (true, format!("overstayed {overstay_minutes} min"))
                } else {
                    (true, format!("{remaining_minutes} min remaining"))
                }
            }
            CheckOutcome::NotFound => (false, "unknown ticket".into()),
            CheckOutcome::Expired => (false, "ticket expired".into()),
            CheckOutcome::NotInside => (false, "not inside".into()),
        },
        AdmissionDecision::Exit(outcome) => match outcome {
            ExitOutcome::Released {
                remaining_minutes, ..
            } => (
                true,
                format!("released, {remaining_minutes} min banked (door open)"),
            ),
            ExitOutcome::Overstayed {
                overstay_minutes,
                overstay_charge,
                ..
            } => (
                false,
                format!(
                    "overstay {overstay_minutes} min, charge {overstay_charge} due (door closed)"
                ),
            ),
            ExitOutcome::NotFound => (false, "unknown ticket".into()),
            ExitOutcome::Expired => (false, "ticket expired".into()),
            ExitOutcome::NotInside => (false, "not inside".into()),
        },
    }
}
