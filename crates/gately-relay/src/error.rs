use thiserror::Error;

/// Failure modes when actuating a door relay.
///
/// Relay calls are fire-and-forget from the admission path: callers log
/// these and move on. A failed pulse never rolls back an admission that
/// has already been committed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("relay transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The relay endpoint answered with a non-success status.
    #[error("relay endpoint rejected pulse (HTTP {status})")]
    Rejected { status: u16 },

    /// The configured endpoint URL could not be parsed.
    #[error("invalid relay endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}
