// ── Admission event record ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use super::code::ScanCode;

/// Which terminal operation produced a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanKind {
    Entry,
    Check,
    Exit,
}

/// Immutable record of one successful scan outcome.
///
/// Produced on every admitted ENTRY/CHECK/EXIT and handed to the event
/// log and any subscribed collaborators (dashboards, audit). Never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionEvent {
    pub id: Uuid,
    pub code: ScanCode,
    pub kind: ScanKind,
    pub terminal_id: String,
    pub timestamp: DateTime<Utc>,
    /// Minutes left at the instant of the scan, clamped at zero.
    pub remaining_minutes: u32,
    /// Minutes over the allowance at the instant of the scan; zero if
    /// within time.
    pub overstay_minutes: u32,
}

impl AdmissionEvent {
    pub fn record(
        code: ScanCode,
        kind: ScanKind,
        terminal_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        remaining_minutes: u32,
        overstay_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            kind,
            terminal_id: terminal_id.into(),
            timestamp,
            remaining_minutes,
            overstay_minutes,
        }
    }
}
