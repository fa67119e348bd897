// Telemetry event entity type
//
// A TelemetryEvent is one timestamped piece of evidence belonging to exactly
// one Incident. Events are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::incident::Severity;

/// Closed set of detectable fault kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PacketLossSpike,
    BitrateDrop,
    FreezeDetected,
    PtsJump,
    AudioClipping,
    BlackFrames,
    ResolutionChange,
    CodecChange,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::PacketLossSpike => write!(f, "packet_loss_spike"),
            EventKind::BitrateDrop => write!(f, "bitrate_drop"),
            EventKind::FreezeDetected => write!(f, "freeze_detected"),
            EventKind::PtsJump => write!(f, "pts_jump"),
            EventKind::AudioClipping => write!(f, "audio_clipping"),
            EventKind::BlackFrames => write!(f, "black_frames"),
            EventKind::ResolutionChange => write!(f, "resolution_change"),
            EventKind::CodecChange => write!(f, "codec_change"),
        }
    }
}

/// TelemetryEvent - one timestamped piece of evidence for an Incident
///
/// `evidence` is an open JSON object whose keys vary per kind (loss rates,
/// bitrates, durations). Keys are preserved verbatim for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub id: String,
    pub incident_id: String,
    pub session_id: String,
    pub line_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub severity: Severity,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    pub evidence: serde_json::Value,
}
