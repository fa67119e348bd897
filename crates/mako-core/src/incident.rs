// Incident domain types
//
// An Incident is one detected fault episode on a monitored session/line.
// Status only moves forward (open -> ack -> resolved); resolved is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fault severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Incident lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Ack,
    Resolved,
}

impl IncidentStatus {
    /// Whether a transition from `self` to `next` moves the status forward.
    ///
    /// Permitted: open -> ack, open -> resolved, ack -> resolved.
    /// Everything else (including self-transitions) is not a forward move.
    pub fn can_advance_to(self, next: IncidentStatus) -> bool {
        match (self, next) {
            (IncidentStatus::Open, IncidentStatus::Ack) => true,
            (IncidentStatus::Open, IncidentStatus::Resolved) => true,
            (IncidentStatus::Ack, IncidentStatus::Resolved) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentStatus::Open => write!(f, "open"),
            IncidentStatus::Ack => write!(f, "ack"),
            IncidentStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// Incident - a detected fault episode with a lifecycle status
///
/// `ended_at` is stamped when the incident resolves and never cleared once
/// set. Mutations go through the lifecycle controller only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub session_id: String,
    pub session_name: String,
    pub primary_line_id: String,
    pub primary_line_label: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub summary: String,
    pub created_by: String,
}

impl Incident {
    /// Whether the incident is still unresolved
    pub fn is_active(&self) -> bool {
        self.status != IncidentStatus::Resolved
    }
}
