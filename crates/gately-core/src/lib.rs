// gately-core: admission state machine and scan pipeline for the gately terminals.
//
// Control flow: raw keystrokes → ScanDecoder → validated code →
// definition resolution (new codes) or ticket lookup (known codes) →
// Lifecycle decision → committed ticket + admission event + door pulse.

pub mod config;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod model;
pub mod resolve;
pub mod scan;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::GateConfig;
pub use error::CoreError;
pub use gate::{AdmissionDecision, Gate};
pub use lifecycle::{CheckOutcome, EntryOutcome, ExitOutcome, Lifecycle, elapsed_minutes};
pub use resolve::resolve;
pub use scan::{FULL_CODE_WIDTH, KeyEvent, ScanDecoder, ScanOutcome, ScanReject, ScannerConfig};
pub use store::{CommitError, DefinitionStore, EventLog, TicketStore, VersionedTicket};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AdmissionEvent, CodeDefinition, CodeParseError, CodeSelector, ScanCode, ScanKind,
    SelectorParseError, Ticket, TicketStatus,
};
