// ── Core error types ──
//
// Domain outcomes (UnknownCode, Expired, AlreadyInside, ...) are NOT
// errors: they are enum variants on the admission outcomes, reported
// for display and logging. `CoreError` covers the genuine faults.

use thiserror::Error;

use crate::store::CommitError;

/// System faults from the gate. Every failing admission leaves stored
/// ticket state unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The read-decide-commit loop kept losing the compare-and-swap
    /// race and gave up. The caller may simply re-scan.
    #[error("commit contention on ticket {code}: gave up after {attempts} attempts")]
    CommitContention { code: String, attempts: u32 },

    /// A commit failed in a way the retry loop does not handle.
    #[error("ticket store rejected commit: {0}")]
    Store(#[from] CommitError),
}
