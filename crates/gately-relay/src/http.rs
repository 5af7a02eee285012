// ── HTTP relay endpoint client ──
//
// Talks to a local relay server (Node box, ESP32, Raspberry Pi) that
// exposes POST /open-door. The wire contract is a small JSON body;
// anything beyond 2xx is treated as a rejected pulse.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::DoorPulse;
use crate::error::RelayError;

/// Default per-request timeout. Relay boxes are on the local network;
/// if they don't answer quickly they won't answer at all.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct OpenDoorRequest<'a> {
    terminal_id: &'a str,
    duration_ms: u64,
}

/// Client for an HTTP door-relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpRelay {
    /// Build a client for the given endpoint base URL (e.g.
    /// `http://localhost:3001`).
    pub fn new(endpoint: &str) -> Result<Self, RelayError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, RelayError> {
        let endpoint: Url = endpoint.parse()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gately/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one open-door pulse.
    pub async fn pulse(&self, pulse: &DoorPulse) -> Result<(), RelayError> {
        let url = self.endpoint.join("open-door")?;

        let response = self
            .client
            .post(url)
            .json(&OpenDoorRequest {
                terminal_id: &pulse.terminal_id,
                duration_ms: pulse.duration.as_millis().try_into().unwrap_or(u64::MAX),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(terminal = %pulse.terminal_id, "door pulse delivered");
            Ok(())
        } else {
            Err(RelayError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
