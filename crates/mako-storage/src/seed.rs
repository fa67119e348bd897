// Seed fixtures
//
// First access to an empty medium installs these collections so the engine is
// never observed empty. The constants are the persisted layout verbatim; the
// accessors parse them into domain types on demand.

use mako_core::{Alert, Incident, TelemetryEvent};

const SEED_INCIDENTS: &str = r#"[
  {
    "id": "inc-001",
    "sessionId": "sess-001",
    "sessionName": "Super Bowl LVIII — Main Feed",
    "primaryLineId": "line-3",
    "primaryLineLabel": "Line 3 — Program",
    "startedAt": "2026-02-13T15:14:08Z",
    "endedAt": null,
    "severity": "critical",
    "status": "open",
    "summary": "Sustained packet loss spike on Line 3 (1.8%) with freeze risk. Loss rose from 0.1% → 1.8% over 4 seconds.",
    "createdBy": "quinn"
  },
  {
    "id": "inc-002",
    "sessionId": "sess-001",
    "sessionName": "Super Bowl LVIII — Main Feed",
    "primaryLineId": "line-1",
    "primaryLineLabel": "Line 1 — Camera A",
    "startedAt": "2026-02-13T14:52:30Z",
    "endedAt": "2026-02-13T14:53:45Z",
    "severity": "warn",
    "status": "resolved",
    "summary": "Brief audio clipping detected on Line 1. Peak exceeded -1.0 dBFS for 800ms.",
    "createdBy": "quinn"
  },
  {
    "id": "inc-003",
    "sessionId": "sess-002",
    "sessionName": "Champions League Semi — QC",
    "primaryLineId": "line-2",
    "primaryLineLabel": "Line 2 — Camera B",
    "startedAt": "2026-02-13T13:22:00Z",
    "endedAt": "2026-02-13T13:22:18Z",
    "severity": "warn",
    "status": "ack",
    "summary": "Bitrate dropped 42% on Line 2 for 18 seconds. Recovered automatically.",
    "createdBy": "quinn"
  },
  {
    "id": "inc-004",
    "sessionId": "sess-001",
    "sessionName": "Super Bowl LVIII — Main Feed",
    "primaryLineId": "line-2",
    "primaryLineLabel": "Line 2 — Camera B",
    "startedAt": "2026-02-13T14:41:00Z",
    "endedAt": "2026-02-13T14:41:30Z",
    "severity": "info",
    "status": "resolved",
    "summary": "Resolution change detected on Line 2: 1920×1080 → 3840×2160. Codec switched to H.265.",
    "createdBy": "quinn"
  }
]"#;

const SEED_EVENTS: &str = r#"[
  { "id": "ev-001", "incidentId": "inc-001", "sessionId": "sess-001", "lineId": "line-3", "timestamp": "2026-02-13T15:14:08Z", "type": "packet_loss_spike", "severity": "critical", "confidence": 0.95, "evidence": { "lossBefore": 0.1, "lossAfter": 1.8, "durationMs": 4200 } },
  { "id": "ev-002", "incidentId": "inc-001", "sessionId": "sess-001", "lineId": "line-3", "timestamp": "2026-02-13T15:14:12Z", "type": "freeze_detected", "severity": "critical", "confidence": 0.88, "evidence": { "freezeDurationMs": 2100, "framesDuplicated": 63 } },
  { "id": "ev-003", "incidentId": "inc-002", "sessionId": "sess-001", "lineId": "line-1", "timestamp": "2026-02-13T14:52:30Z", "type": "audio_clipping", "severity": "warn", "confidence": 0.92, "evidence": { "peakDbfs": -0.3, "durationMs": 800 } },
  { "id": "ev-004", "incidentId": "inc-003", "sessionId": "sess-002", "lineId": "line-2", "timestamp": "2026-02-13T13:22:00Z", "type": "bitrate_drop", "severity": "warn", "confidence": 0.97, "evidence": { "bitrateBefore": 12.1, "bitrateAfter": 7.0, "dropPct": 42 } },
  { "id": "ev-005", "incidentId": "inc-004", "sessionId": "sess-001", "lineId": "line-2", "timestamp": "2026-02-13T14:41:00Z", "type": "resolution_change", "severity": "info", "confidence": 1.0, "evidence": { "from": "1920×1080", "to": "3840×2160" } },
  { "id": "ev-006", "incidentId": "inc-004", "sessionId": "sess-001", "lineId": "line-2", "timestamp": "2026-02-13T14:41:00Z", "type": "codec_change", "severity": "info", "confidence": 1.0, "evidence": { "from": "H.264 High", "to": "H.265 Main" } }
]"#;

const SEED_ALERTS: &str = r#"[
  { "id": "al-001", "incidentId": "inc-001", "targetUserId": "u1", "deliveredAt": "2026-02-13T15:14:10Z", "ackAt": null },
  { "id": "al-002", "incidentId": "inc-002", "targetUserId": "u1", "deliveredAt": "2026-02-13T14:52:32Z", "ackAt": "2026-02-13T14:53:00Z" }
]"#;

/// Four incidents across two sessions: one open critical, one acked, two resolved.
pub fn incidents() -> Vec<Incident> {
    serde_json::from_str(SEED_INCIDENTS).unwrap_or_default()
}

/// Six events covering both incidents of the open/resolved pair plus the
/// resolution/codec change pair on inc-004.
pub fn events() -> Vec<TelemetryEvent> {
    serde_json::from_str(SEED_EVENTS).unwrap_or_default()
}

/// Two alerts for the current user: al-001 still unacked, al-002 acked.
pub fn alerts() -> Vec<Alert> {
    serde_json::from_str(SEED_ALERTS).unwrap_or_default()
}
