// Bounded telemetry store
//
// Persists each collection (incidents, events, alerts) as one JSON array under
// a fixed key, most-recent-first. Appends insert at the front and truncate to
// the retention cap; eviction is silent. Reads parse the payload on every
// call; a missing payload installs the seed fixtures, a malformed payload is
// replaced by them. Storage trouble is logged and absorbed, never surfaced.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use mako_core::{Alert, Incident, KeyValueMedium, TelemetryEvent};

use crate::seed;

pub const INCIDENTS_KEY: &str = "mako_quinn_incidents";
pub const EVENTS_KEY: &str = "mako_quinn_events";
pub const ALERTS_KEY: &str = "mako_quinn_alerts";

/// Retention caps, persisted-layout constants.
pub const MAX_INCIDENTS: usize = 100;
pub const MAX_EVENTS: usize = 200;
pub const MAX_ALERTS: usize = 100;

/// Owns the three telemetry collections and the change-notification channel.
///
/// Every mutation is a whole-collection replacement on the medium (last write
/// wins, no partial writes to observe), followed by a version bump that wakes
/// all subscribed [`ChangeListener`]s.
pub struct TelemetryStore {
    medium: Arc<dyn KeyValueMedium>,
    changes: watch::Sender<u64>,
}

impl TelemetryStore {
    pub fn new(medium: Arc<dyn KeyValueMedium>) -> Self {
        let (changes, _) = watch::channel(0);
        Self { medium, changes }
    }

    /// Registers an observer. Each listener is independent; notifications
    /// coalesce, so a slow observer sees at least one wake-up per burst.
    pub fn subscribe(&self) -> ChangeListener {
        ChangeListener {
            rx: self.changes.subscribe(),
        }
    }

    // ============================================================
    // Reads (most-recent-first)
    // ============================================================

    pub fn incidents(&self) -> Vec<Incident> {
        self.read_or_seed(INCIDENTS_KEY, seed::incidents)
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.read_or_seed(EVENTS_KEY, seed::events)
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.read_or_seed(ALERTS_KEY, seed::alerts)
    }

    // ============================================================
    // Writes
    // ============================================================

    pub fn append_incident(&self, incident: Incident) {
        self.append(INCIDENTS_KEY, MAX_INCIDENTS, seed::incidents, incident);
    }

    pub fn append_event(&self, event: TelemetryEvent) {
        self.append(EVENTS_KEY, MAX_EVENTS, seed::events, event);
    }

    pub fn append_alert(&self, alert: Alert) {
        self.append(ALERTS_KEY, MAX_ALERTS, seed::alerts, alert);
    }

    /// Replaces the stored incident with the same id, keeping its position.
    /// Unknown ids are ignored.
    pub fn update_incident(&self, incident: Incident) {
        let mut incidents = self.incidents();
        match incidents.iter().position(|i| i.id == incident.id) {
            Some(idx) => {
                incidents[idx] = incident;
                self.write(INCIDENTS_KEY, &incidents);
            }
            None => debug!(incident_id = %incident.id, "update for unknown incident ignored"),
        }
    }

    /// Replaces the stored alert with the same id, keeping its position.
    /// Unknown ids are ignored.
    pub fn update_alert(&self, alert: Alert) {
        let mut alerts = self.alerts();
        match alerts.iter().position(|a| a.id == alert.id) {
            Some(idx) => {
                alerts[idx] = alert;
                self.write(ALERTS_KEY, &alerts);
            }
            None => debug!(alert_id = %alert.id, "update for unknown alert ignored"),
        }
    }

    // ============================================================
    // Medium round-trips
    // ============================================================

    fn read_or_seed<T>(&self, key: &str, seed: fn() -> Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.medium.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => return items,
                Err(e) => warn!(key, error = %e, "malformed telemetry payload, reseeding"),
            },
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "telemetry read failed, falling back to seed data"),
        }
        let seeded = seed();
        self.write(key, &seeded);
        seeded
    }

    fn append<T>(&self, key: &str, cap: usize, seed: fn() -> Vec<T>, item: T)
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items = self.read_or_seed(key, seed);
        items.insert(0, item);
        items.truncate(cap);
        self.write(key, &items);
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) {
        let raw = match serde_json::to_string(items) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "telemetry serialization failed, dropping write");
                return;
            }
        };
        if let Err(e) = self.medium.set(key, &raw) {
            warn!(key, error = %e, "telemetry write failed, dropping write");
            return;
        }
        self.changes.send_modify(|version| *version += 1);
    }
}

/// Wakes whenever the store persists a write. Carries no payload; observers
/// re-read whatever views they need.
pub struct ChangeListener {
    rx: watch::Receiver<u64>,
}

impl ChangeListener {
    /// Waits for the next store write. Returns `false` once the store has
    /// been dropped and no further writes can happen.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
