// ── Simulated relay ──
//
// Stands in for real hardware on terminals without a wired relay and in
// tests. Records every pulse so callers can assert on actuation.

use std::sync::{Arc, Mutex};

use crate::DoorPulse;
use crate::error::RelayError;

/// In-process relay that records pulses instead of actuating hardware.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRelay {
    pulses: Arc<Mutex<Vec<DoorPulse>>>,
}

impl SimulatedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulse(&self, pulse: &DoorPulse) -> Result<(), RelayError> {
        tracing::info!(
            terminal = %pulse.terminal_id,
            duration_ms = pulse.duration.as_millis(),
            "simulated door pulse"
        );
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(pulse.clone());
        }
        Ok(())
    }

    /// All pulses recorded so far, oldest first.
    pub fn recorded(&self) -> Vec<DoorPulse> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn pulse_count(&self) -> usize {
        self.pulses.lock().map(|p| p.len()).unwrap_or(0)
    }
}
