//! End-to-end admission flows: decoder → resolver → lifecycle → stores,
//! exercised through the public `Gate` API.
#![allow(clippy::unwrap_used)]

use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};

use gately_core::{
    CheckOutcome, CodeDefinition, CodeSelector, EntryOutcome, ExitOutcome, Gate, GateConfig,
    KeyEvent, ScanCode, ScanDecoder, ScanOutcome, ScannerConfig, TicketStatus,
};
use gately_relay::{Relay, SimulatedRelay};

fn definitions() -> Vec<CodeDefinition> {
    vec![
        CodeDefinition {
            id: "hour".into(),
            name: "One hour".into(),
            description: Some("Worked example from the price list".into()),
            selector: CodeSelector::parse("03041000").unwrap(),
            color: Some("#4caf50".into()),
            duration_minutes: 60,
            price: 100,
            price_per_extra_minute: 5,
            active: true,
        },
        CodeDefinition {
            id: "day".into(),
            name: "Full day".into(),
            description: None,
            selector: CodeSelector::parse("10000000-19999999").unwrap(),
            color: None,
            duration_minutes: 600,
            price: 350,
            price_per_extra_minute: 2,
            active: true,
        },
    ]
}

fn gate_with(relay: &SimulatedRelay, terminal: &str) -> Gate {
    let mut config = GateConfig::new(terminal);
    config.day_offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let gate = Gate::new(config, Relay::Simulated(relay.clone()));
    gate.load_definitions(definitions());
    gate
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// The worked example: scan "03041000" on a 60-minute/rate-5
/// definition, stay 70 minutes, owe 50 at the exit.
#[tokio::test]
async fn worked_example_overstay_charge() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let code = ScanCode::parse("03041000").unwrap();

    let entry = gate.admit_entry(&code, t0()).await.unwrap();
    let EntryOutcome::Admitted { ticket, event } = entry else {
        panic!("expected admission, got {entry:?}");
    };
    assert_eq!(ticket.remaining_minutes, 60);
    assert_eq!(event.remaining_minutes, 60);

    let exit = gate
        .admit_exit(&code, t0() + TimeDelta::minutes(70))
        .await
        .unwrap();
    let ExitOutcome::Overstayed {
        ticket,
        overstay_minutes,
        overstay_charge,
        ..
    } = exit
    else {
        panic!("expected overstay, got {exit:?}");
    };
    assert_eq!(overstay_minutes, 10);
    assert_eq!(overstay_charge, 50);
    assert_eq!(ticket.status, TicketStatus::Left);
    assert_eq!(ticket.remaining_minutes, 0);
}

/// A full service day: enter, check, exit with balance, re-enter on
/// the same ticket, and find it expired the next day.
#[tokio::test]
async fn full_day_visit_with_reentry() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let code = ScanCode::parse("15000001").unwrap();

    // 09:00 enter on the 600-minute day ticket.
    let entry = gate.admit_entry(&code, t0()).await.unwrap();
    assert!(matches!(entry, EntryOutcome::Admitted { .. }));

    // 10:00 check: 540 left.
    let check = gate
        .admit_check(&code, t0() + TimeDelta::minutes(60))
        .await
        .unwrap();
    let CheckOutcome::Inside {
        remaining_minutes, ..
    } = check
    else {
        panic!("expected inside, got {check:?}");
    };
    assert_eq!(remaining_minutes, 540);

    // 11:00 exit for lunch: 480 banked.
    let exit = gate
        .admit_exit(&code, t0() + TimeDelta::minutes(120))
        .await
        .unwrap();
    let ExitOutcome::Released {
        remaining_minutes, ..
    } = exit
    else {
        panic!("expected release, got {exit:?}");
    };
    assert_eq!(remaining_minutes, 480);

    // 12:00 re-entry succeeds and keeps the original first_scan.
    let reentry = gate
        .admit_entry(&code, t0() + TimeDelta::minutes(180))
        .await
        .unwrap();
    let EntryOutcome::Admitted { ticket, .. } = reentry else {
        panic!("expected re-admission, got {reentry:?}");
    };
    assert_eq!(ticket.first_scan, Some(t0()));
    assert_eq!(ticket.scan_count, 4);

    // Next morning everything is expired.
    let next_day = t0() + TimeDelta::days(1);
    assert!(matches!(
        gate.admit_check(&code, next_day).await.unwrap(),
        CheckOutcome::Expired
    ));
    assert!(matches!(
        gate.admit_exit(&code, next_day).await.unwrap(),
        ExitOutcome::Expired
    ));
    assert!(matches!(
        gate.admit_entry(&code, next_day).await.unwrap(),
        EntryOutcome::Expired
    ));
}

/// An exhausted ticket cannot re-enter; one with balance can.
#[tokio::test]
async fn exhausted_balance_blocks_reentry() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let code = ScanCode::parse("03041000").unwrap();

    gate.admit_entry(&code, t0()).await.unwrap();
    // Stay past the allowance; balance clamps to zero.
    gate.admit_exit(&code, t0() + TimeDelta::minutes(65))
        .await
        .unwrap();

    let retry = gate
        .admit_entry(&code, t0() + TimeDelta::minutes(70))
        .await
        .unwrap();
    assert_eq!(retry, EntryOutcome::TimeExhausted);
}

/// Keystrokes from a reader flow through the decoder into the gate,
/// with the dropped-leading-zero normalization applied.
#[tokio::test]
async fn decoder_feeds_the_gate() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let mut decoder = ScanDecoder::new(ScannerConfig::default());

    // Reader dropped the leading zero of "03041000".
    let mut outcome = ScanOutcome::Pending;
    for (i, ch) in "3041000\n".chars().enumerate() {
        let at = t0() + TimeDelta::milliseconds(i as i64 * 20);
        outcome = decoder.push(KeyEvent::new(ch, at));
    }

    let ScanOutcome::Accepted(code) = outcome else {
        panic!("expected accepted scan, got {outcome:?}");
    };
    assert_eq!(code.as_str(), "03041000");

    let entry = gate.admit_entry(&code, t0()).await.unwrap();
    assert!(matches!(entry, EntryOutcome::Admitted { .. }));
}

/// Two terminals racing on the same (cloned) barcode: exactly one
/// admission wins, the other reports AlreadyInside.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_entries_admit_exactly_once() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let code = ScanCode::parse("15000042").unwrap();

    let g1 = gate.clone();
    let g2 = gate.clone();
    let c1 = code.clone();
    let c2 = code.clone();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { g1.admit_entry(&c1, t0()).await.unwrap() }),
        tokio::spawn(async move { g2.admit_entry(&c2, t0()).await.unwrap() }),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let admitted = outcomes
        .iter()
        .filter(|o| matches!(o, EntryOutcome::Admitted { .. }))
        .count();
    let inside = outcomes
        .iter()
        .filter(|o| matches!(o, EntryOutcome::AlreadyInside))
        .count();

    assert_eq!(admitted, 1, "exactly one admission must win");
    assert_eq!(inside, 1, "the loser re-decides against the committed record");

    let stored = gate.tickets().get(&code).unwrap();
    assert_eq!(stored.ticket.scan_count, 1);
    settle().await;
}

/// Every admitted operation leaves an event; denied ones do not.
#[tokio::test]
async fn event_log_records_only_successes() {
    let relay = SimulatedRelay::new();
    let gate = gate_with(&relay, "entry-1");
    let code = ScanCode::parse("03041000").unwrap();

    gate.admit_entry(&code, t0()).await.unwrap();
    gate.admit_entry(&code, t0() + TimeDelta::minutes(1))
        .await
        .unwrap(); // AlreadyInside
    gate.admit_check(&code, t0() + TimeDelta::minutes(10))
        .await
        .unwrap();
    gate.admit_exit(&code, t0() + TimeDelta::minutes(20))
        .await
        .unwrap();

    let events = gate.events().snapshot();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind.to_string(), "ENTRY");
    assert_eq!(events[1].kind.to_string(), "CHECK");
    assert_eq!(events[2].kind.to_string(), "EXIT");
}
