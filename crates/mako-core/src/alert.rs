// Alert entity type
//
// An Alert is a delivery record notifying one user about one Incident.
// Only warn/critical incidents produce alerts; acknowledgement happens
// automatically when the owning incident moves to ack or resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert - a per-user delivery/acknowledgement record for a non-info Incident
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub incident_id: String,
    pub target_user_id: String,
    pub delivered_at: DateTime<Utc>,
    /// Absent until acknowledged; once set, never cleared
    pub ack_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Whether the alert still awaits acknowledgement
    pub fn is_unacked(&self) -> bool {
        self.ack_at.is_none()
    }
}
