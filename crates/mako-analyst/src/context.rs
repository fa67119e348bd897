// Analysis context builder
//
// Assembles the bounded incident/event snapshot attached to an outbound
// analysis request and renders it into the system message. The snapshot is a
// read of whatever the store holds at request time; it is never persisted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use mako_core::{Incident, TelemetryEvent};
use mako_storage::TelemetryStore;

/// Persona and grounding rules for the analyst.
pub const SYSTEM_PROMPT: &str = r#"You are Quinn, an AI broadcast engineering analyst for the MAKO platform. You monitor live video streams (SRT ingest) and help operators understand incidents.

CRITICAL RULES:
- Only use the provided incident/event data. Never invent metrics, timestamps, or evidence.
- Always cite evidence with exact numbers (loss %, bitrate Mbps, timestamps).
- If data is missing, say so explicitly.
- Label uncertainty: "Most likely", "Possibly", "Unknown".
- Keep answers concise and actionable, like a senior broadcast engineer.
- Reference incidents by their ID and affected line.
- When listing incidents, include severity, status, and key evidence.
- For recommended checks, be specific and non-invasive.

OUTPUT FORMAT:
- Use markdown for structure (bold, bullets, code for metrics).
- Always include timestamps when referencing events.
- End with "Suggested next steps" when relevant."#;

const MAX_CONTEXT_INCIDENTS: usize = 20;
const MAX_SESSION_EVENTS: usize = 40;
const MAX_GLOBAL_EVENTS: usize = 30;

/// Bounded snapshot of recent telemetry for one analysis request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    pub incidents: Vec<Incident>,
    pub events: Vec<TelemetryEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
}

impl AnalysisContext {
    /// Gathers the snapshot: up to 20 most-recent incidents and, when scoped
    /// to a session, up to 40 of its most-recent events (30 global events
    /// otherwise). The session display name comes from its newest incident.
    pub fn gather(store: &TelemetryStore, session_id: Option<&str>) -> Self {
        match session_id {
            Some(session_id) => {
                let incidents: Vec<Incident> = store
                    .incidents()
                    .into_iter()
                    .filter(|i| i.session_id == session_id)
                    .take(MAX_CONTEXT_INCIDENTS)
                    .collect();
                let events = store
                    .events()
                    .into_iter()
                    .filter(|e| e.session_id == session_id)
                    .take(MAX_SESSION_EVENTS)
                    .collect();
                let session_name = incidents.first().map(|i| i.session_name.clone());
                Self {
                    incidents,
                    events,
                    session_name,
                }
            }
            None => Self {
                incidents: store
                    .incidents()
                    .into_iter()
                    .take(MAX_CONTEXT_INCIDENTS)
                    .collect(),
                events: store.events().into_iter().take(MAX_GLOBAL_EVENTS).collect(),
                session_name: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty() && self.events.is_empty() && self.session_name.is_none()
    }

    /// Renders the retrieved-context block appended to the system prompt.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.incidents.is_empty() {
            out.push_str("\n\n## ACTIVE INCIDENTS\n");
            for inc in &self.incidents {
                out.push_str(&format!(
                    "\n### {} [{}] [{}]\n",
                    inc.id,
                    inc.severity.to_string().to_uppercase(),
                    inc.status
                ));
                out.push_str(&format!("- Session: {}\n", inc.session_name));
                out.push_str(&format!("- Line: {}\n", inc.primary_line_label));
                out.push_str(&format!("- Started: {}\n", stamp(inc.started_at)));
                out.push_str(&format!(
                    "- Ended: {}\n",
                    inc.ended_at.map(stamp).unwrap_or_else(|| "Ongoing".to_string())
                ));
                out.push_str(&format!("- Summary: {}\n", inc.summary));
            }
        }
        if !self.events.is_empty() {
            out.push_str("\n\n## EVENT LOG\n");
            for ev in &self.events {
                out.push_str(&format!(
                    "- [{}] {} on {} ({}, confidence {:.0}%) — Evidence: {}\n",
                    stamp(ev.timestamp),
                    ev.kind,
                    ev.line_id,
                    ev.severity,
                    ev.confidence * 100.0,
                    ev.evidence
                ));
            }
        }
        if let Some(name) = &self.session_name {
            out.push_str(&format!("\n\n## CURRENT SESSION: {name}\n"));
        }
        out
    }

    /// Full system message for one analysis request.
    pub fn system_message(&self) -> String {
        if self.is_empty() {
            format!("{SYSTEM_PROMPT}\n\nNo incident data available.")
        } else {
            format!("{SYSTEM_PROMPT}\n\n--- RETRIEVED CONTEXT ---{}", self.render())
        }
    }
}

fn stamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
