// ── Ticket store with optimistic concurrency ──
//
// Tickets are keyed by their normalized scan code and stamped with a
// revision. Commits go through compare-and-swap: two terminals racing
// on the same code (a cloned or shared barcode) cannot both win, and
// the loser re-decides against the freshly read record.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;
use tokio::sync::watch;

use crate::model::{ScanCode, Ticket, TicketStatus};

/// Commit failure against the ticket store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// `insert_new` raced with another creation of the same code.
    #[error("ticket {code} already exists")]
    AlreadyExists { code: String },

    /// The record changed between read and write.
    #[error("ticket {code} changed concurrently (expected revision {expected}, found {found})")]
    Conflict {
        code: String,
        expected: u64,
        found: u64,
    },

    /// The record vanished between read and write. Tickets are never
    /// deleted by the engine, so this means an external administrative
    /// deletion raced the commit.
    #[error("ticket {code} disappeared during commit")]
    Missing { code: String },
}

/// A ticket together with its store revision.
#[derive(Debug, Clone)]
pub struct VersionedTicket {
    pub revision: u64,
    pub ticket: Arc<Ticket>,
}

/// Concurrent ticket storage with revision-stamped compare-and-swap.
pub struct TicketStore {
    by_code: DashMap<String, VersionedTicket>,
    snapshot: watch::Sender<Arc<Vec<Arc<Ticket>>>>,
}

impl TicketStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_code: DashMap::new(),
            snapshot,
        }
    }

    /// Read the current record and revision for a code.
    pub fn get(&self, code: &ScanCode) -> Option<VersionedTicket> {
        self.by_code.get(code.as_str()).map(|r| r.value().clone())
    }

    /// Create a ticket that must not exist yet. The entry lock makes
    /// the existence check and the insert a single atomic step.
    pub fn insert_new(&self, ticket: Ticket) -> Result<VersionedTicket, CommitError> {
        let key = ticket.code.as_str().to_owned();
        let result = match self.by_code.entry(key) {
            Entry::Occupied(_) => Err(CommitError::AlreadyExists {
                code: ticket.code.to_string(),
            }),
            Entry::Vacant(slot) => {
                let versioned = VersionedTicket {
                    revision: 1,
                    ticket: Arc::new(ticket),
                };
                slot.insert(versioned.clone());
                Ok(versioned)
            }
        };
        if result.is_ok() {
            self.rebuild_snapshot();
        }
        result
    }

    /// Replace an existing record if its revision still matches.
    pub fn compare_and_swap(
        &self,
        expected_revision: u64,
        ticket: Ticket,
    ) -> Result<VersionedTicket, CommitError> {
        let key = ticket.code.as_str().to_owned();
        let result = match self.by_code.entry(key) {
            Entry::Vacant(_) => Err(CommitError::Missing {
                code: ticket.code.to_string(),
            }),
            Entry::Occupied(mut slot) => {
                let found = slot.get().revision;
                if found == expected_revision {
                    let versioned = VersionedTicket {
                        revision: found + 1,
                        ticket: Arc::new(ticket),
                    };
                    slot.insert(versioned.clone());
                    Ok(versioned)
                } else {
                    Err(CommitError::Conflict {
                        code: ticket.code.to_string(),
                        expected: expected_revision,
                        found,
                    })
                }
            }
        };
        if result.is_ok() {
            self.rebuild_snapshot();
        }
        result
    }

    /// Unconditional upsert, for externally provisioned tickets and
    /// snapshot loads. Not used on the admission path.
    pub fn put(&self, ticket: Ticket) {
        let key = ticket.code.as_str().to_owned();
        match self.by_code.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(VersionedTicket {
                    revision: 1,
                    ticket: Arc::new(ticket),
                });
            }
            Entry::Occupied(mut slot) => {
                let revision = slot.get().revision + 1;
                slot.insert(VersionedTicket {
                    revision,
                    ticket: Arc::new(ticket),
                });
            }
        }
        self.rebuild_snapshot();
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<Ticket>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Ticket>>>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Tickets currently inside the venue.
    pub fn inside_count(&self) -> usize {
        self.by_code
            .iter()
            .filter(|r| r.value().ticket.status == TicketStatus::Inside)
            .count()
    }

    fn rebuild_snapshot(&self) {
        let tickets: Vec<Arc<Ticket>> = self
            .by_code
            .iter()
            .map(|r| Arc::clone(&r.value().ticket))
            .collect();
        self.snapshot.send_modify(|snap| *snap = Arc::new(tickets));
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}
