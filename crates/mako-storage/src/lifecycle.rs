// Incident lifecycle controller
//
// All status mutation funnels through here: forward-only transitions, the
// resolved timestamp, and the alert auto-ack side effect. Also answers the
// session/user-scoped read queries and renders the downloadable report.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mako_core::{Clock, Incident, IncidentStatus, SystemClock, TelemetryEvent};

use crate::store::TelemetryStore;

/// Snapshot bundled for export: one incident plus every event that cites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentReport {
    pub incident: Incident,
    pub events: Vec<TelemetryEvent>,
}

/// Download name for an exported report.
pub fn report_filename(incident_id: &str) -> String {
    format!("incident-{incident_id}.json")
}

pub struct IncidentLifecycle {
    store: Arc<TelemetryStore>,
    clock: Arc<dyn Clock>,
}

impl IncidentLifecycle {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<TelemetryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // ============================================================
    // Scoped reads
    // ============================================================

    pub fn incidents_for_session(&self, session_id: &str) -> Vec<Incident> {
        self.store
            .incidents()
            .into_iter()
            .filter(|i| i.session_id == session_id)
            .collect()
    }

    pub fn events_for_incident(&self, incident_id: &str) -> Vec<TelemetryEvent> {
        self.store
            .events()
            .into_iter()
            .filter(|e| e.incident_id == incident_id)
            .collect()
    }

    /// Alerts addressed to `user_id` that nobody has acknowledged yet.
    pub fn unacked_alert_count(&self, user_id: &str) -> usize {
        self.store
            .alerts()
            .iter()
            .filter(|a| a.target_user_id == user_id && a.is_unacked())
            .count()
    }

    /// Same count narrowed to alerts whose incident belongs to `session_id`.
    pub fn unacked_alert_count_for_session(&self, session_id: &str, user_id: &str) -> usize {
        let incident_ids: HashSet<String> = self
            .incidents_for_session(session_id)
            .into_iter()
            .map(|i| i.id)
            .collect();
        self.store
            .alerts()
            .iter()
            .filter(|a| {
                a.target_user_id == user_id
                    && a.is_unacked()
                    && incident_ids.contains(&a.incident_id)
            })
            .count()
    }

    // ============================================================
    // Status mutation
    // ============================================================

    /// Advances an incident to `new_status` and auto-acks its alerts.
    ///
    /// Unknown ids and non-forward transitions (including repeats) are ignored
    /// and reported via the return value. Resolving stamps `ended_at`; moving
    /// to ack or resolved acknowledges every unacked alert for the incident.
    pub fn update_status(&self, incident_id: &str, new_status: IncidentStatus) -> bool {
        let Some(incident) = self
            .store
            .incidents()
            .into_iter()
            .find(|i| i.id == incident_id)
        else {
            debug!(incident_id, "status update for unknown incident ignored");
            return false;
        };

        if !incident.status.can_advance_to(new_status) {
            warn!(
                incident_id,
                from = %incident.status,
                to = %new_status,
                "ignoring non-forward status transition"
            );
            return false;
        }

        let now = self.clock.now();
        let mut updated = incident;
        updated.status = new_status;
        if new_status == IncidentStatus::Resolved {
            updated.ended_at = Some(now);
        }
        self.store.update_incident(updated);
        info!(incident_id, status = %new_status, "incident status advanced");

        if matches!(new_status, IncidentStatus::Ack | IncidentStatus::Resolved) {
            for alert in self.store.alerts() {
                if alert.incident_id == incident_id && alert.is_unacked() {
                    let mut acked = alert;
                    acked.ack_at = Some(now);
                    self.store.update_alert(acked);
                }
            }
        }

        true
    }

    // ============================================================
    // Report export
    // ============================================================

    pub fn report(&self, incident_id: &str) -> Option<IncidentReport> {
        let incident = self
            .store
            .incidents()
            .into_iter()
            .find(|i| i.id == incident_id)?;
        let events = self.events_for_incident(incident_id);
        Some(IncidentReport { incident, events })
    }

    /// Human-indented JSON for download; `{}` when the incident is unknown.
    pub fn export_report(&self, incident_id: &str) -> String {
        match self.report(incident_id) {
            Some(report) => {
                serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
            }
            None => "{}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::InMemoryMedium;
    use chrono::{DateTime, Utc};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixture() -> (Arc<TelemetryStore>, IncidentLifecycle, DateTime<Utc>) {
        let store = Arc::new(TelemetryStore::new(Arc::new(InMemoryMedium::new())));
        let now: DateTime<Utc> = "2026-02-13T16:30:00Z".parse().unwrap();
        let lifecycle = IncidentLifecycle::with_clock(store.clone(), Arc::new(FixedClock(now)));
        (store, lifecycle, now)
    }

    #[test]
    fn test_session_and_incident_filters() {
        let (_, lifecycle, _) = fixture();

        let main_feed = lifecycle.incidents_for_session("sess-001");
        assert_eq!(main_feed.len(), 3);
        assert!(main_feed.iter().all(|i| i.session_id == "sess-001"));

        let evidence = lifecycle.events_for_incident("inc-004");
        assert_eq!(evidence.len(), 2);
        assert!(evidence.iter().all(|e| e.incident_id == "inc-004"));
    }

    #[test]
    fn test_unacked_counts_on_seed_data() {
        let (_, lifecycle, _) = fixture();
        assert_eq!(lifecycle.unacked_alert_count("u1"), 1);
        assert_eq!(lifecycle.unacked_alert_count_for_session("sess-001", "u1"), 1);
        assert_eq!(lifecycle.unacked_alert_count_for_session("sess-002", "u1"), 0);
        assert_eq!(lifecycle.unacked_alert_count("u2"), 0);
    }

    #[test]
    fn test_ack_acks_alerts_but_keeps_ended_at() {
        let (store, lifecycle, now) = fixture();

        assert!(lifecycle.update_status("inc-001", IncidentStatus::Ack));

        let incident = store
            .incidents()
            .into_iter()
            .find(|i| i.id == "inc-001")
            .unwrap();
        assert_eq!(incident.status, IncidentStatus::Ack);
        assert!(incident.ended_at.is_none());

        let alert = store
            .alerts()
            .into_iter()
            .find(|a| a.id == "al-001")
            .unwrap();
        assert_eq!(alert.ack_at, Some(now));
        assert_eq!(lifecycle.unacked_alert_count("u1"), 0);
    }

    #[test]
    fn test_resolve_stamps_ended_at_and_acks() {
        let (store, lifecycle, now) = fixture();

        assert!(lifecycle.update_status("inc-001", IncidentStatus::Resolved));

        let incident = store
            .incidents()
            .into_iter()
            .find(|i| i.id == "inc-001")
            .unwrap();
        assert_eq!(incident.status, IncidentStatus::Resolved);
        assert_eq!(incident.ended_at, Some(now));
        assert_eq!(lifecycle.unacked_alert_count("u1"), 0);
    }

    #[test]
    fn test_backward_transition_is_rejected() {
        let (store, lifecycle, _) = fixture();

        // inc-002 is resolved in the seed set.
        assert!(!lifecycle.update_status("inc-002", IncidentStatus::Ack));

        let incident = store
            .incidents()
            .into_iter()
            .find(|i| i.id == "inc-002")
            .unwrap();
        assert_eq!(incident.status, IncidentStatus::Resolved);
    }

    #[test]
    fn test_unknown_incident_is_a_no_op() {
        let (_, lifecycle, _) = fixture();
        assert!(!lifecycle.update_status("inc-ghost", IncidentStatus::Ack));
    }

    #[test]
    fn test_export_report_bundles_incident_and_events() {
        let (_, lifecycle, _) = fixture();

        let raw = lifecycle.export_report("inc-001");
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["incident"]["id"], "inc-001");
        assert_eq!(parsed["events"].as_array().unwrap().len(), 2);
        // Human-indented for download.
        assert!(raw.contains("\n  "));
    }

    #[test]
    fn test_export_report_unknown_incident_yields_empty_object() {
        let (_, lifecycle, _) = fixture();
        assert_eq!(lifecycle.export_report("inc-ghost"), "{}");
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("inc-001"), "incident-inc-001.json");
    }
}
