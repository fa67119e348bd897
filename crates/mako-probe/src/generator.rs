// Tick synthesis
//
// Each tick fabricates one open incident with its evidence event (plus an
// alert for warn/critical), appends everything through the store, then gives
// stale open incidents a chance to auto-resolve so the open list stays
// bounded without an operator.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use mako_core::{Alert, Clock, Incident, IncidentStatus, Severity, TelemetryEvent};
use mako_storage::{IncidentLifecycle, TelemetryStore};

use crate::templates::{catalog, draw2, FaultTemplate, LINES, SESSIONS};
use crate::worker::ProbeConfig;

/// One synthesized incident with its evidence event and optional alert.
/// The alert is absent for info severity.
pub struct SyntheticBatch {
    pub incident: Incident,
    pub event: TelemetryEvent,
    pub alert: Option<Alert>,
}

/// What one tick did. Returned so observers and tests can follow the
/// simulation without re-deriving it from store diffs.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub incident_id: String,
    pub severity: Severity,
    pub alerted: bool,
    /// Id of the stale incident the auto-resolve pass closed, if any
    pub auto_resolved: Option<String>,
}

/// Synthesizes one batch from a random template, line, and session.
pub fn synthesize(rng: &mut StdRng, now: DateTime<Utc>, target_user_id: &str) -> SyntheticBatch {
    let templates = catalog();
    let template = &templates[rng.gen_range(0..templates.len())];
    synthesize_from(template, rng, now, target_user_id)
}

pub(crate) fn synthesize_from(
    template: &FaultTemplate,
    rng: &mut StdRng,
    now: DateTime<Utc>,
    target_user_id: &str,
) -> SyntheticBatch {
    let line = &LINES[rng.gen_range(0..LINES.len())];
    let session = &SESSIONS[rng.gen_range(0..SESSIONS.len())];
    let incident_id = format!("inc-sim-{}", Uuid::now_v7());

    let incident = Incident {
        id: incident_id.clone(),
        session_id: session.id.to_string(),
        session_name: session.name.to_string(),
        primary_line_id: line.id.to_string(),
        primary_line_label: line.label.to_string(),
        started_at: now,
        ended_at: None,
        severity: template.severity,
        status: IncidentStatus::Open,
        summary: template.summary(rng),
        created_by: "quinn".to_string(),
    };

    let event = TelemetryEvent {
        id: format!("ev-sim-{}", Uuid::now_v7()),
        incident_id: incident_id.clone(),
        session_id: session.id.to_string(),
        line_id: line.id.to_string(),
        timestamp: now,
        kind: template.kind,
        severity: template.severity,
        confidence: draw2(rng, 0.82, 0.99),
        evidence: template.evidence(rng),
    };

    let alert = (template.severity != Severity::Info).then(|| Alert {
        id: format!("al-sim-{}", Uuid::now_v7()),
        incident_id,
        target_user_id: target_user_id.to_string(),
        delivered_at: now,
        ack_at: None,
    });

    SyntheticBatch {
        incident,
        event,
        alert,
    }
}

/// Runs one simulator tick: synthesize, persist, then the auto-resolve pass.
pub fn run_tick(
    store: &TelemetryStore,
    lifecycle: &IncidentLifecycle,
    clock: &dyn Clock,
    rng: &mut StdRng,
    config: &ProbeConfig,
) -> TickOutcome {
    let now = clock.now();
    let batch = synthesize(rng, now, &config.target_user_id);
    let incident_id = batch.incident.id.clone();
    let severity = batch.incident.severity;
    let alerted = batch.alert.is_some();

    store.append_incident(batch.incident);
    store.append_event(batch.event);
    if let Some(alert) = batch.alert {
        store.append_alert(alert);
    }
    info!(incident_id = %incident_id, severity = %severity, alerted, "synthesized incident");

    let auto_resolved = auto_resolve_stale(store, lifecycle, now, rng, config);

    TickOutcome {
        incident_id,
        severity,
        alerted,
        auto_resolved,
    }
}

/// With the configured probability, resolves one uniformly chosen open
/// incident older than the age threshold. Resolution goes through the
/// lifecycle controller so `ended_at` is stamped and alerts auto-ack.
fn auto_resolve_stale(
    store: &TelemetryStore,
    lifecycle: &IncidentLifecycle,
    now: DateTime<Utc>,
    rng: &mut StdRng,
    config: &ProbeConfig,
) -> Option<String> {
    let age = chrono::Duration::from_std(config.auto_resolve_age)
        .unwrap_or_else(|_| chrono::Duration::max_value());
    let cutoff = now - age;

    let stale: Vec<String> = store
        .incidents()
        .into_iter()
        .filter(|i| i.status == IncidentStatus::Open && i.started_at < cutoff)
        .map(|i| i.id)
        .collect();

    if stale.is_empty() || rng.gen::<f64>() >= config.auto_resolve_probability {
        return None;
    }

    let id = stale[rng.gen_range(0..stale.len())].clone();
    if lifecycle.update_status(&id, IncidentStatus::Resolved) {
        debug!(incident_id = %id, "auto-resolved stale incident");
        Some(id)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mako_core::EventKind;
    use rand::SeedableRng;
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    fn now() -> DateTime<Utc> {
        "2026-02-13T16:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_batch_links_event_and_alert_to_incident() {
        let mut rng = rng();
        let batch = synthesize(&mut rng, now(), "u1");

        assert!(batch.incident.id.starts_with("inc-sim-"));
        assert_eq!(batch.event.incident_id, batch.incident.id);
        assert_eq!(batch.event.session_id, batch.incident.session_id);
        assert_eq!(batch.event.line_id, batch.incident.primary_line_id);
        assert_eq!(batch.event.timestamp, batch.incident.started_at);
        assert_eq!(batch.incident.status, IncidentStatus::Open);
        assert!(batch.incident.ended_at.is_none());
        assert_eq!(batch.incident.created_by, "quinn");

        // Catalog only holds warn/critical, so every batch carries an alert.
        let alert = batch.alert.unwrap();
        assert_eq!(alert.incident_id, batch.incident.id);
        assert_eq!(alert.target_user_id, "u1");
        assert!(alert.is_unacked());
    }

    #[test]
    fn test_confidence_stays_in_range() {
        let mut rng = rng();
        for _ in 0..200 {
            let batch = synthesize(&mut rng, now(), "u1");
            assert!((0.82..=0.99).contains(&batch.event.confidence));
        }
    }

    #[test]
    fn test_info_severity_produces_no_alert() {
        let info_template = FaultTemplate {
            kind: EventKind::ResolutionChange,
            severity: Severity::Info,
            summary_fn: |_| "Resolution change detected.".to_string(),
            evidence_fn: |_| json!({ "from": "1920×1080", "to": "3840×2160" }),
        };

        let mut rng = rng();
        let batch = synthesize_from(&info_template, &mut rng, now(), "u1");
        assert!(batch.alert.is_none());
        assert_eq!(batch.incident.severity, Severity::Info);
    }
}
