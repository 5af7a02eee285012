// ── Gate orchestrator ──
//
// Wires the pieces together for one terminal: code lookup, definition
// resolution, the pure lifecycle decision, the optimistic commit, event
// fan-out, and the door relay pulse. The decision itself never touches
// the store, so a lost compare-and-swap race is handled by re-reading
// and re-deciding.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use gately_relay::{DoorPulse, Relay};

use crate::config::GateConfig;
use crate::error::CoreError;
use crate::lifecycle::{CheckOutcome, EntryOutcome, ExitOutcome, Lifecycle};
use crate::model::{AdmissionEvent, CodeDefinition, ScanCode, ScanKind, Ticket};
use crate::resolve::resolve;
use crate::store::{DefinitionStore, EventLog, TicketStore};

const EVENT_CHANNEL_SIZE: usize = 256;

/// Commit attempts before giving up. Contention on a single code means
/// the same barcode is being scanned at multiple terminals at once.
const MAX_COMMIT_ATTEMPTS: u32 = 4;

/// One admission decision, tagged by operation for callers that
/// dispatch on terminal mode.
#[derive(Debug, Clone)]
pub enum AdmissionDecision {
    Entry(EntryOutcome),
    Check(CheckOutcome),
    Exit(ExitOutcome),
}

/// The main entry point for terminal frontends.
///
/// Cheaply cloneable; all state lives behind an `Arc`. One gate serves
/// one venue's stores and may be shared by several terminal loops.
#[derive(Clone)]
pub struct Gate {
    inner: Arc<GateInner>,
}

struct GateInner {
    config: GateConfig,
    lifecycle: Lifecycle,
    tickets: TicketStore,
    definitions: DefinitionStore,
    events: EventLog,
    event_tx: broadcast::Sender<Arc<AdmissionEvent>>,
    relay: Relay,
}

impl Gate {
    pub fn new(config: GateConfig, relay: Relay) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let lifecycle = Lifecycle::new(config.day_offset);
        let events = EventLog::new(config.event_retention);

        Self {
            inner: Arc::new(GateInner {
                config,
                lifecycle,
                tickets: TicketStore::new(),
                definitions: DefinitionStore::new(),
                events,
                event_tx,
                relay,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &GateConfig {
        &self.inner.config
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.inner.lifecycle
    }

    pub fn tickets(&self) -> &TicketStore {
        &self.inner.tickets
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.inner.definitions
    }

    pub fn events(&self) -> &EventLog {
        &self.inner.events
    }

    /// Subscribe to admission events as they are produced.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Arc<AdmissionEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Load (or reload) the active code definitions.
    pub fn load_definitions(&self, definitions: Vec<CodeDefinition>) -> usize {
        self.inner.definitions.replace(definitions)
    }

    /// Store an externally provisioned ticket (sold but not yet used).
    pub fn provision_ticket(&self, ticket: Ticket) {
        self.inner.tickets.put(ticket);
    }

    // ── Admission operations ─────────────────────────────────────────

    /// Dispatch a scan by operation kind.
    pub async fn admit(
        &self,
        code: &ScanCode,
        kind: ScanKind,
        now: DateTime<Utc>,
    ) -> Result<AdmissionDecision, CoreError> {
        match kind {
            ScanKind::Entry => Ok(AdmissionDecision::Entry(self.admit_entry(code, now).await?)),
            ScanKind::Check => Ok(AdmissionDecision::Check(self.admit_check(code, now).await?)),
            ScanKind::Exit => Ok(AdmissionDecision::Exit(self.admit_exit(code, now).await?)),
        }
    }

    /// ENTRY: admit a new or returning ticket; opens the door on
    /// success.
    pub async fn admit_entry(
        &self,
        code: &ScanCode,
        now: DateTime<Utc>,
    ) -> Result<EntryOutcome, CoreError> {
        let terminal = self.inner.config.terminal_id.as_str();

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.inner.tickets.get(code);

            let outcome = if let Some(versioned) = &current {
                self.inner
                    .lifecycle
                    .admit_entry(code, Some(&versioned.ticket), None, terminal, now)
            } else {
                let definitions = self.inner.definitions.snapshot();
                let definition = resolve(code, &definitions);
                self.inner.lifecycle.admit_entry(
                    code,
                    None,
                    definition.map(|d| d.as_ref()),
                    terminal,
                    now,
                )
            };

            let EntryOutcome::Admitted { ticket, event } = outcome else {
                info!(code = %code, outcome = ?outcome, "entry denied");
                return Ok(outcome);
            };

            let committed = match &current {
                Some(versioned) => self
                    .inner
                    .tickets
                    .compare_and_swap(versioned.revision, ticket.clone()),
                None => self.inner.tickets.insert_new(ticket.clone()),
            };

            match committed {
                Ok(_) => {
                    self.publish(event.clone());
                    self.open_door();
                    return Ok(EntryOutcome::Admitted { ticket, event });
                }
                Err(err) => {
                    debug!(code = %code, attempt, error = %err, "entry commit lost the race, re-deciding");
                }
            }
        }

        Err(CoreError::CommitContention {
            code: code.to_string(),
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }

    /// CHECK: mid-visit time inquiry. Never opens a door.
    pub async fn admit_check(
        &self,
        code: &ScanCode,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome, CoreError> {
        let terminal = self.inner.config.terminal_id.as_str();

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.inner.tickets.get(code);
            let outcome = self.inner.lifecycle.admit_check(
                code,
                current.as_ref().map(|v| v.ticket.as_ref()),
                terminal,
                now,
            );

            let CheckOutcome::Inside {
                ticket,
                event,
                remaining_minutes,
                overstay_minutes,
            } = outcome
            else {
                info!(code = %code, outcome = ?outcome, "check denied");
                return Ok(outcome);
            };

            // `Inside` implies the ticket existed on read.
            let Some(versioned) = current else {
                continue;
            };

            match self
                .inner
                .tickets
                .compare_and_swap(versioned.revision, ticket.clone())
            {
                Ok(_) => {
                    self.publish(event.clone());
                    return Ok(CheckOutcome::Inside {
                        ticket,
                        event,
                        remaining_minutes,
                        overstay_minutes,
                    });
                }
                Err(err) => {
                    debug!(code = %code, attempt, error = %err, "check commit lost the race, re-deciding");
                }
            }
        }

        Err(CoreError::CommitContention {
            code: code.to_string(),
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }

    /// EXIT: settle the visit. Opens the door unless an overstay charge
    /// is due, in which case an operator collects payment first.
    pub async fn admit_exit(
        &self,
        code: &ScanCode,
        now: DateTime<Utc>,
    ) -> Result<ExitOutcome, CoreError> {
        let terminal = self.inner.config.terminal_id.as_str();

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.inner.tickets.get(code);
            let definition = current
                .as_ref()
                .and_then(|v| self.inner.definitions.by_id(&v.ticket.range_id));

            let outcome = self.inner.lifecycle.admit_exit(
                code,
                current.as_ref().map(|v| v.ticket.as_ref()),
                definition.as_deref(),
                terminal,
                now,
            );

            let (ticket, event) = match &outcome {
                ExitOutcome::Released { ticket, event, .. }
                | ExitOutcome::Overstayed { ticket, event, .. } => (ticket.clone(), event.clone()),
                _ => {
                    info!(code = %code, outcome = ?outcome, "exit denied");
                    return Ok(outcome);
                }
            };

            let Some(versioned) = current else {
                continue;
            };

            match self.inner.tickets.compare_and_swap(versioned.revision, ticket) {
                Ok(_) => {
                    self.publish(event);
                    if let ExitOutcome::Released { .. } = &outcome {
                        self.open_door();
                    }
                    return Ok(outcome);
                }
                Err(err) => {
                    debug!(code = %code, attempt, error = %err, "exit commit lost the race, re-deciding");
                }
            }
        }

        Err(CoreError::CommitContention {
            code: code.to_string(),
            attempts: MAX_COMMIT_ATTEMPTS,
        })
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Log and broadcast one admission event.
    fn publish(&self, event: AdmissionEvent) {
        info!(
            code = %event.code,
            kind = %event.kind,
            terminal = %event.terminal_id,
            remaining = event.remaining_minutes,
            overstay = event.overstay_minutes,
            "admission event"
        );
        let event = self.inner.events.append(event);
        // No subscribers is fine; the log still has it.
        let _ = self.inner.event_tx.send(event);
    }

    /// Fire-and-forget door pulse. A relay failure is logged and never
    /// rolls back the admission already committed.
    fn open_door(&self) {
        let relay = self.inner.relay.clone();
        let pulse = DoorPulse::new(
            self.inner.config.terminal_id.clone(),
            self.inner.config.door_pulse,
        );
        tokio::spawn(async move {
            if let Err(err) = relay.open_door(&pulse).await {
                warn!(terminal = %pulse.terminal_id, error = %err, "door relay pulse failed");
            }
        });
    }
}
