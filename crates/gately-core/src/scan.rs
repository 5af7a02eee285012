// ── Scan decoder ──
//
// Turns keyboard-emulated barcode reader input into validated scan
// codes. USB readers type digits much faster than a human and finish
// with Enter; everything slower or non-numeric is manual typing and is
// discarded. One decoder instance serves one physical input stream and
// owns its buffer and debounce state.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ScanCode;

/// Canonical full code width. Some readers drop the leading zero of an
/// 8-digit code; a 7-digit candidate is left-padded back to this width.
pub const FULL_CODE_WIDTH: usize = 8;

/// One keystroke from the input stream, tagged with its arrival time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub ch: char,
    pub at: DateTime<Utc>,
}

impl KeyEvent {
    pub fn new(ch: char, at: DateTime<Utc>) -> Self {
        Self { ch, at }
    }
}

/// Decoder tuning. Defaults match the reference reader hardware
/// (Desktop SL20UD and pistol-grip readers in keyboard mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Shortest acceptable code (7 tolerates a dropped leading zero).
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Longest acceptable code (EAN-13).
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Maximum gap between digits before the buffer reads as manual
    /// typing and is discarded.
    #[serde(default = "default_inter_key_timeout_ms")]
    pub inter_key_timeout_ms: u64,
    /// Window in which a repeat of the same code is suppressed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Whether the reader terminates each scan with Enter. When false,
    /// a flush happens as soon as `max_length` digits accumulate.
    #[serde(default = "default_require_terminator")]
    pub require_terminator: bool,
}

fn default_min_length() -> usize {
    7
}
fn default_max_length() -> usize {
    13
}
fn default_inter_key_timeout_ms() -> u64 {
    100
}
fn default_debounce_ms() -> u64 {
    3000
}
fn default_require_terminator() -> bool {
    true
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            inter_key_timeout_ms: default_inter_key_timeout_ms(),
            debounce_ms: default_debounce_ms(),
            require_terminator: default_require_terminator(),
        }
    }
}

/// Why a flushed candidate was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanReject {
    /// Candidate length outside `[min_length, max_length]`.
    InvalidFormat { length: usize },
    /// Same code accepted again within the debounce window.
    Debounced,
}

/// Result of feeding one key event (or an explicit flush) to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A validated, normalized code.
    Accepted(ScanCode),
    /// Nothing to report yet; the buffer may be accumulating.
    Pending,
    /// A candidate was flushed but not emitted.
    Rejected(ScanReject),
}

/// Stateful decoder for one physical input stream.
///
/// Not meant to be shared across concurrent input sources; each
/// terminal holds its own instance.
#[derive(Debug)]
pub struct ScanDecoder {
    config: ScannerConfig,
    buffer: String,
    last_key_at: Option<DateTime<Utc>>,
    /// Last *accepted* time per code value. Keyed by code so two
    /// different codes scanned back-to-back are both accepted.
    last_accepted: HashMap<String, DateTime<Utc>>,
}

impl ScanDecoder {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_key_at: None,
            last_accepted: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Discard any pending buffer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_key_at = None;
    }

    /// Feed one key event.
    pub fn push(&mut self, event: KeyEvent) -> ScanOutcome {
        self.expire_stale_buffer(event.at);

        if event.ch.is_ascii_digit() {
            self.buffer.push(event.ch);
            self.last_key_at = Some(event.at);

            if !self.config.require_terminator && self.buffer.len() >= self.config.max_length {
                return self.flush(event.at);
            }
            return ScanOutcome::Pending;
        }

        if is_terminator(event.ch) && self.config.require_terminator {
            if self.buffer.is_empty() {
                return ScanOutcome::Pending;
            }
            return self.flush(event.at);
        }

        // Anything else is manual typing; the buffer was never a scan.
        self.reset();
        ScanOutcome::Pending
    }

    /// Flush the pending buffer as a candidate code.
    ///
    /// Called internally on the terminator and exposed for callers
    /// whose input layer delivers end-of-line out of band.
    pub fn flush(&mut self, at: DateTime<Utc>) -> ScanOutcome {
        let mut candidate = std::mem::take(&mut self.buffer);
        self.last_key_at = None;

        if candidate.is_empty() {
            return ScanOutcome::Pending;
        }

        // Compensate for readers that drop a leading zero.
        if candidate.len() == FULL_CODE_WIDTH - 1 {
            candidate.insert(0, '0');
        }

        if candidate.len() < self.config.min_length || candidate.len() > self.config.max_length {
            return ScanOutcome::Rejected(ScanReject::InvalidFormat {
                length: candidate.len(),
            });
        }

        if let Some(accepted_at) = self.last_accepted.get(&candidate) {
            if within(at, *accepted_at, self.config.debounce_ms) {
                return ScanOutcome::Rejected(ScanReject::Debounced);
            }
        }

        self.last_accepted.insert(candidate.clone(), at);
        self.prune_debounce(at);

        // The buffer only ever accumulates ASCII digits, so this cannot
        // fail for internally flushed candidates.
        match ScanCode::parse(&candidate) {
            Ok(code) => ScanOutcome::Accepted(code),
            Err(_) => ScanOutcome::Rejected(ScanReject::InvalidFormat {
                length: candidate.len(),
            }),
        }
    }

    /// Discard the buffer when the inter-key gap exceeds the timeout.
    fn expire_stale_buffer(&mut self, at: DateTime<Utc>) {
        if let Some(last) = self.last_key_at {
            if !self.buffer.is_empty() && !within(at, last, self.config.inter_key_timeout_ms) {
                tracing::trace!(stale = %self.buffer, "inter-key timeout, buffer discarded");
                self.reset();
            }
        }
    }

    /// Drop debounce entries that have aged out of the window.
    fn prune_debounce(&mut self, at: DateTime<Utc>) {
        let window = self.config.debounce_ms;
        self.last_accepted.retain(|_, t| within(at, *t, window));
    }
}

fn is_terminator(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

fn within(now: DateTime<Utc>, earlier: DateTime<Utc>, window_ms: u64) -> bool {
    let window = TimeDelta::milliseconds(i64::try_from(window_ms).unwrap_or(i64::MAX));
    now.signed_duration_since(earlier) <= window
}
