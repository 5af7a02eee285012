// ── Bounded admission event log ──
//
// Keeps the most recent admission events in memory for dashboards and
// the live-activity view; durable event storage belongs to the
// external persistence collaborator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::model::AdmissionEvent;

/// Append-only, bounded in-memory event log with reactive snapshots.
pub struct EventLog {
    capacity: usize,
    entries: Mutex<VecDeque<Arc<AdmissionEvent>>>,
    snapshot: watch::Sender<Arc<Vec<Arc<AdmissionEvent>>>>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
            snapshot,
        }
    }

    /// Append an event, evicting the oldest past capacity.
    pub fn append(&self, event: AdmissionEvent) -> Arc<AdmissionEvent> {
        let event = Arc::new(event);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.push_back(Arc::clone(&event));
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        let current: Vec<Arc<AdmissionEvent>> = entries.iter().map(Arc::clone).collect();
        drop(entries);

        self.snapshot.send_modify(|snap| *snap = Arc::new(current));
        event
    }

    /// Current snapshot, oldest first.
    pub fn snapshot(&self) -> Arc<Vec<Arc<AdmissionEvent>>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<AdmissionEvent>>>> {
        self.snapshot.subscribe()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ScanCode, ScanKind};
    use chrono::{TimeZone, Utc};

    fn event(code: &str) -> AdmissionEvent {
        AdmissionEvent::record(
            ScanCode::parse(code).unwrap(),
            ScanKind::Entry,
            "entry-1",
            Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap(),
            60,
            0,
        )
    }

    #[test]
    fn append_is_ordered_oldest_first() {
        let log = EventLog::new(16);
        log.append(event("10000001"));
        log.append(event("10000002"));

        let snapshot = log.snapshot();
        assert_eq!(snapshot[0].code.as_str(), "10000001");
        assert_eq!(snapshot[1].code.as_str(), "10000002");
    }

    #[test]
    fn capacity_evicts_oldest() {
        let log = EventLog::new(2);
        log.append(event("10000001"));
        log.append(event("10000002"));
        log.append(event("10000003"));

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].code.as_str(), "10000002");
    }
}
