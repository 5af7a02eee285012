// ── Gate configuration ──

use std::time::Duration;

use chrono::{FixedOffset, Local};

use crate::scan::ScannerConfig;

/// Configuration for one gate terminal.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Terminal identifier stamped on every admission event
    /// (e.g. "entry-1", "check-2").
    pub terminal_id: String,

    /// Scan decoder tuning for this terminal's reader.
    pub scanner: ScannerConfig,

    /// Venue UTC offset; aligns the same-day validity check to local
    /// midnight.
    pub day_offset: FixedOffset,

    /// How long the door relay is held open per admission.
    pub door_pulse: Duration,

    /// How many admission events the in-memory log retains.
    pub event_retention: usize,
}

impl GateConfig {
    /// Reference defaults: host-local midnight alignment, 5 s door
    /// pulse, 256 retained events.
    pub fn new(terminal_id: impl Into<String>) -> Self {
        Self {
            terminal_id: terminal_id.into(),
            scanner: ScannerConfig::default(),
            day_offset: *Local::now().offset(),
            door_pulse: Duration::from_secs(5),
            event_retention: 256,
        }
    }
}
