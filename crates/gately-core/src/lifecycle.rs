// ── Ticket lifecycle engine ──
//
// The authoritative state machine for one ticket across its valid
// lifetime (one calendar day). Every decision is a pure function of
// (ticket, definition, now): no I/O, no clock reads, no store access.
// That keeps the read-decide-commit loop in the gate safely retryable
// against a freshly read record.

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::model::{AdmissionEvent, CodeDefinition, ScanCode, ScanKind, Ticket, TicketStatus};

/// Outcome of an ENTRY attempt. All failures are reported outcomes,
/// not faults, and leave stored ticket state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Admit the visitor and open the door. `ticket` is the record to
    /// commit; `event` the record to log.
    Admitted {
        ticket: Ticket,
        event: AdmissionEvent,
    },
    /// No ticket exists and no definition claims the code.
    UnknownCode,
    /// The ticket's service day has passed (or it is marked expired).
    Expired,
    /// The ticket is already inside; a clone or double scan.
    AlreadyInside,
    /// A LEFT ticket with no time balance; a new ticket must be bought.
    TimeExhausted,
}

/// Outcome of a CHECK (mid-visit time inquiry). Never opens a door.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Inside; `remaining_minutes`/`overstay_minutes` report the time
    /// position. An overstay here is informational, not a rejection.
    Inside {
        ticket: Ticket,
        event: AdmissionEvent,
        remaining_minutes: u32,
        overstay_minutes: u32,
    },
    NotFound,
    Expired,
    NotInside,
}

/// Outcome of an EXIT attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Within time: commit the ticket, open the door.
    Released {
        ticket: Ticket,
        event: AdmissionEvent,
        remaining_minutes: u32,
    },
    /// Over time: commit the ticket but keep the door shut until an
    /// operator collects `overstay_charge`.
    Overstayed {
        ticket: Ticket,
        event: AdmissionEvent,
        overstay_minutes: u32,
        overstay_charge: u64,
    },
    NotFound,
    Expired,
    NotInside,
}

/// Minutes elapsed between two instants, floored. Never rounds up.
pub fn elapsed_minutes(first: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(first).num_seconds().div_euclid(60)
}

/// The lifecycle state machine.
///
/// Carries only the venue's UTC offset, used to align the same-day
/// validity check to local midnight. Kept explicit (rather than read
/// from the host ambiently) so decisions stay deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    day_offset: FixedOffset,
}

impl Lifecycle {
    pub fn new(day_offset: FixedOffset) -> Self {
        Self { day_offset }
    }

    /// Lifecycle aligned to the host's local timezone offset.
    pub fn host_local() -> Self {
        Self::new(*Local::now().offset())
    }

    pub fn day_offset(&self) -> FixedOffset {
        self.day_offset
    }

    /// Do two instants fall on the same venue-local calendar day?
    pub fn same_service_day(&self, first: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        first.with_timezone(&self.day_offset).date_naive()
            == now.with_timezone(&self.day_offset).date_naive()
    }

    /// A ticket is valid only on the calendar day of its first ENTRY.
    /// An unset `first_scan` means the ticket has never been used and
    /// validity is not yet constrained.
    fn valid_today(&self, ticket: &Ticket, now: DateTime<Utc>) -> bool {
        ticket
            .first_scan
            .is_none_or(|first| self.same_service_day(first, now))
    }

    /// Decide an ENTRY scan.
    ///
    /// `definition` is only consulted when no ticket exists yet (a new
    /// code being issued); for known tickets the stored record rules.
    pub fn admit_entry(
        &self,
        code: &ScanCode,
        existing: Option<&Ticket>,
        definition: Option<&CodeDefinition>,
        terminal_id: &str,
        now: DateTime<Utc>,
    ) -> EntryOutcome {
        let Some(ticket) = existing else {
            let Some(definition) = definition else {
                return EntryOutcome::UnknownCode;
            };
            let ticket = Ticket::issue(code.clone(), definition, now);
            let event = AdmissionEvent::record(
                code.clone(),
                ScanKind::Entry,
                terminal_id,
                now,
                ticket.allowed_minutes,
                0,
            );
            return EntryOutcome::Admitted { ticket, event };
        };

        if !self.valid_today(ticket, now) {
            return EntryOutcome::Expired;
        }

        match ticket.status {
            TicketStatus::Expired => EntryOutcome::Expired,
            TicketStatus::Inside => EntryOutcome::AlreadyInside,
            TicketStatus::Active => {
                // Pre-provisioned ticket, first entry: the admission
                // date is anchored now.
                let mut updated = ticket.clone();
                updated.status = TicketStatus::Inside;
                updated.first_scan = Some(now);
                updated.last_scan = Some(now);
                updated.scan_count += 1;
                updated.updated_at = now;
                let event = AdmissionEvent::record(
                    code.clone(),
                    ScanKind::Entry,
                    terminal_id,
                    now,
                    updated.remaining_minutes,
                    0,
                );
                EntryOutcome::Admitted {
                    ticket: updated,
                    event,
                }
            }
            TicketStatus::Left => {
                if ticket.remaining_minutes == 0 {
                    return EntryOutcome::TimeExhausted;
                }
                // Same-day re-entry: first_scan keeps the original
                // admission date; the balance is consumed only at EXIT.
                let mut updated = ticket.clone();
                updated.status = TicketStatus::Inside;
                updated.last_scan = Some(now);
                updated.scan_count += 1;
                updated.updated_at = now;
                let event = AdmissionEvent::record(
                    code.clone(),
                    ScanKind::Entry,
                    terminal_id,
                    now,
                    updated.remaining_minutes,
                    0,
                );
                EntryOutcome::Admitted {
                    ticket: updated,
                    event,
                }
            }
        }
    }

    /// Decide a CHECK scan.
    pub fn admit_check(
        &self,
        code: &ScanCode,
        existing: Option<&Ticket>,
        terminal_id: &str,
        now: DateTime<Utc>,
    ) -> CheckOutcome {
        let Some(ticket) = existing else {
            return CheckOutcome::NotFound;
        };
        if !self.valid_today(ticket, now) {
            return CheckOutcome::Expired;
        }
        if ticket.status != TicketStatus::Inside {
            return CheckOutcome::NotInside;
        }

        let (remaining, overstay) = self.time_position(ticket, now);

        // CHECK touches last_scan/scan_count but never the balance;
        // only EXIT commits a new remaining_minutes.
        let mut updated = ticket.clone();
        updated.last_scan = Some(now);
        updated.scan_count += 1;
        updated.updated_at = now;

        let event = AdmissionEvent::record(
            code.clone(),
            ScanKind::Check,
            terminal_id,
            now,
            remaining,
            overstay,
        );
        CheckOutcome::Inside {
            ticket: updated,
            event,
            remaining_minutes: remaining,
            overstay_minutes: overstay,
        }
    }

    /// Decide an EXIT scan.
    ///
    /// `definition` supplies the overstay rate; a missing definition
    /// (deleted since issuance) charges at rate zero.
    pub fn admit_exit(
        &self,
        code: &ScanCode,
        existing: Option<&Ticket>,
        definition: Option<&CodeDefinition>,
        terminal_id: &str,
        now: DateTime<Utc>,
    ) -> ExitOutcome {
        let Some(ticket) = existing else {
            return ExitOutcome::NotFound;
        };
        if !self.valid_today(ticket, now) {
            return ExitOutcome::Expired;
        }
        if ticket.status != TicketStatus::Inside {
            return ExitOutcome::NotInside;
        }

        let (remaining, overstay) = self.time_position(ticket, now);

        let mut updated = ticket.clone();
        updated.status = TicketStatus::Left;
        updated.last_scan = Some(now);
        updated.scan_count += 1;
        // The clamped balance is what a same-day re-entry can draw on.
        updated.remaining_minutes = remaining;
        updated.updated_at = now;

        let event = AdmissionEvent::record(
            code.clone(),
            ScanKind::Exit,
            terminal_id,
            now,
            remaining,
            overstay,
        );

        if overstay > 0 {
            let rate = definition.map_or(0, |d| d.price_per_extra_minute);
            ExitOutcome::Overstayed {
                ticket: updated,
                event,
                overstay_minutes: overstay,
                overstay_charge: u64::from(overstay) * u64::from(rate),
            }
        } else {
            ExitOutcome::Released {
                ticket: updated,
                event,
                remaining_minutes: remaining,
            }
        }
    }

    /// Remaining/overstay minutes at `now`, both clamped non-negative.
    ///
    /// INSIDE tickets always carry a first_scan; a missing one reads as
    /// zero elapsed.
    fn time_position(&self, ticket: &Ticket, now: DateTime<Utc>) -> (u32, u32) {
        let first = ticket.first_scan.unwrap_or(now);
        let remaining = i64::from(ticket.allowed_minutes) - elapsed_minutes(first, now);
        (clamp_minutes(remaining), clamp_minutes(-remaining))
    }
}

fn clamp_minutes(minutes: i64) -> u32 {
    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}
