//! Door relay actuation for gately access terminals.
//!
//! A terminal that admits a visitor signals its door relay with a short
//! pulse. Two real-world shapes are supported: a local HTTP endpoint
//! (Node box with a USB relay module, or an ESP32/Raspberry Pi) and a
//! simulated relay for terminals without hardware. Selection happens in
//! configuration; the admission engine only sees [`Relay`].

use std::time::Duration;

pub mod error;
mod http;
mod sim;

pub use error::RelayError;
pub use http::HttpRelay;
pub use sim::SimulatedRelay;

/// One door-open request: which terminal, and how long to hold the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorPulse {
    pub terminal_id: String,
    pub duration: Duration,
}

impl DoorPulse {
    pub fn new(terminal_id: impl Into<String>, duration: Duration) -> Self {
        Self {
            terminal_id: terminal_id.into(),
            duration,
        }
    }
}

/// A configured door relay.
///
/// `Disabled` is the correct choice for CHECK terminals, which never
/// open a door.
#[derive(Debug, Clone)]
pub enum Relay {
    Http(HttpRelay),
    Simulated(SimulatedRelay),
    Disabled,
}

impl Relay {
    /// Attempt one open-door pulse. Best effort: errors are reported,
    /// never retried here.
    pub async fn open_door(&self, pulse: &DoorPulse) -> Result<(), RelayError> {
        match self {
            Self::Http(relay) => relay.pulse(pulse).await,
            Self::Simulated(relay) => relay.pulse(pulse),
            Self::Disabled => {
                tracing::debug!(terminal = %pulse.terminal_id, "relay disabled, door stays shut");
                Ok(())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_relay_records_pulses() {
        let sim = SimulatedRelay::new();
        let relay = Relay::Simulated(sim.clone());

        let pulse = DoorPulse::new("entry-1", Duration::from_secs(5));
        relay.open_door(&pulse).await.unwrap();
        relay.open_door(&pulse).await.unwrap();

        assert_eq!(sim.pulse_count(), 2);
        assert_eq!(sim.recorded()[0].terminal_id, "entry-1");
    }

    #[tokio::test]
    async fn disabled_relay_is_a_no_op() {
        let relay = Relay::Disabled;
        let pulse = DoorPulse::new("check-1", Duration::from_secs(5));
        assert!(relay.open_door(&pulse).await.is_ok());
        assert!(!relay.is_enabled());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(HttpRelay::new("not a url").is_err());
    }
}
