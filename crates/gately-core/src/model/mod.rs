// ── Domain model ──
//
// Explicit tagged records for what the hosted document store keeps as
// loosely-typed documents. Unknown shapes are rejected at the serde
// boundary, never inside the engine.

mod code;
mod definition;
mod event;
mod ticket;

pub use code::{CodeParseError, ScanCode};
pub use definition::{CodeDefinition, CodeSelector, SelectorParseError};
pub use event::{AdmissionEvent, ScanKind};
pub use ticket::{Ticket, TicketStatus};
