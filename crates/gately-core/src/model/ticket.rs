// ── Ticket domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::code::ScanCode;
use super::definition::CodeDefinition;

/// Lifecycle status of a ticket.
///
/// `Expired` is terminal and is normally *computed* from the same-day
/// validity check rather than written by a transition; a stored
/// `Expired` is respected either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Provisioned externally, never yet entered.
    Active,
    /// Currently inside the venue.
    Inside,
    /// Exited; may re-enter the same day if time remains.
    Left,
    /// No longer usable.
    Expired,
}

/// One ticket, keyed by its normalized scan code.
///
/// Created at first ENTRY or pre-provisioned externally with status
/// `Active`. Mutated by every ENTRY/CHECK/EXIT; never deleted by the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub code: ScanCode,
    /// Id of the `CodeDefinition` this ticket was issued under.
    pub range_id: String,
    pub status: TicketStatus,
    /// Timestamp of the first successful ENTRY. Anchors both the
    /// same-day validity check and elapsed-time accounting. Unset on
    /// pre-provisioned tickets that have never entered.
    pub first_scan: Option<DateTime<Utc>>,
    /// Timestamp of the most recent scan of any kind.
    pub last_scan: Option<DateTime<Utc>>,
    /// Paid time, copied from the definition at issuance. Immutable.
    pub allowed_minutes: u32,
    /// Minutes left at issuance or at the last EXIT. Only EXIT commits
    /// a new balance; CHECK never writes here.
    pub remaining_minutes: u32,
    pub scan_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Issue a fresh ticket at first ENTRY: status goes straight to
    /// `Inside` with the full time balance.
    pub fn issue(code: ScanCode, definition: &CodeDefinition, now: DateTime<Utc>) -> Self {
        Self {
            code,
            range_id: definition.id.clone(),
            status: TicketStatus::Inside,
            first_scan: Some(now),
            last_scan: Some(now),
            allowed_minutes: definition.duration_minutes,
            remaining_minutes: definition.duration_minutes,
            scan_count: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Pre-provision a ticket that has not yet been used.
    pub fn provision(code: ScanCode, definition: &CodeDefinition, now: DateTime<Utc>) -> Self {
        Self {
            code,
            range_id: definition.id.clone(),
            status: TicketStatus::Active,
            first_scan: None,
            last_scan: None,
            allowed_minutes: definition.duration_minutes,
            remaining_minutes: definition.duration_minutes,
            scan_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_inside(&self) -> bool {
        self.status == TicketStatus::Inside
    }
}
