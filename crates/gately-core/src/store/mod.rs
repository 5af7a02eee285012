// ── In-memory reactive stores ──
//
// Thread-safe storage for tickets, definitions, and the event log.
// Mutations are broadcast to subscribers via `watch` channels. The
// ticket store's revision stamps are the primitive behind the
// at-most-one-admission guarantee.

mod definitions;
mod events;
mod tickets;

pub use definitions::DefinitionStore;
pub use events::EventLog;
pub use tickets::{CommitError, TicketStore, VersionedTicket};
