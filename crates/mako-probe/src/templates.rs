// Fault template catalog
//
// Fixed catalog of synthesizable fault signatures plus the monitored line and
// session catalogs the simulator draws from. Drawn values round to two
// decimals; durations stay integral milliseconds.

use rand::rngs::StdRng;
use rand::Rng;
use serde_json::{json, Value};

use mako_core::{EventKind, Severity};

/// One monitored SRT line
#[derive(Debug, Clone, Copy)]
pub struct MonitoredLine {
    pub id: &'static str,
    pub label: &'static str,
}

/// One monitored session
#[derive(Debug, Clone, Copy)]
pub struct MonitoredSession {
    pub id: &'static str,
    pub name: &'static str,
}

pub const LINES: [MonitoredLine; 3] = [
    MonitoredLine {
        id: "line-1",
        label: "Line 1 — Camera A",
    },
    MonitoredLine {
        id: "line-2",
        label: "Line 2 — Camera B",
    },
    MonitoredLine {
        id: "line-3",
        label: "Line 3 — Program",
    },
];

pub const SESSIONS: [MonitoredSession; 2] = [
    MonitoredSession {
        id: "sess-001",
        name: "Super Bowl LVIII — Main Feed",
    },
    MonitoredSession {
        id: "sess-002",
        name: "Champions League Semi — QC",
    },
];

/// One synthesizable fault signature: a fault kind and severity paired with
/// generators for the human summary and the evidence object.
pub struct FaultTemplate {
    pub kind: EventKind,
    pub severity: Severity,
    pub(crate) summary_fn: fn(&mut StdRng) -> String,
    pub(crate) evidence_fn: fn(&mut StdRng) -> Value,
}

impl FaultTemplate {
    pub fn summary(&self, rng: &mut StdRng) -> String {
        (self.summary_fn)(rng)
    }

    pub fn evidence(&self, rng: &mut StdRng) -> Value {
        (self.evidence_fn)(rng)
    }
}

/// Uniform draw rounded to two decimals
pub(crate) fn draw2(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    (rng.gen_range(min..max) * 100.0).round() / 100.0
}

/// Uniform integral draw, inclusive
fn draw_int(rng: &mut StdRng, min: u64, max: u64) -> u64 {
    rng.gen_range(min..=max)
}

/// The fixed catalog the simulator picks from. No info-severity entries; info
/// incidents come from operator actions, not the probe.
pub fn catalog() -> Vec<FaultTemplate> {
    vec![
        FaultTemplate {
            kind: EventKind::PacketLossSpike,
            severity: Severity::Warn,
            summary_fn: |rng| {
                let v = draw2(rng, 0.5, 1.4);
                format!("Packet loss spike detected ({v}%). Monitoring for sustained impact.")
            },
            evidence_fn: |rng| {
                json!({
                    "lossBefore": draw2(rng, 0.01, 0.1),
                    "lossAfter": draw2(rng, 0.5, 1.4),
                    "durationMs": draw_int(rng, 1500, 6000),
                })
            },
        },
        FaultTemplate {
            kind: EventKind::PacketLossSpike,
            severity: Severity::Critical,
            summary_fn: |rng| {
                let v = draw2(rng, 1.5, 3.0);
                format!("Sustained packet loss at {v}%. High freeze/artifact risk.")
            },
            evidence_fn: |rng| {
                json!({
                    "lossBefore": draw2(rng, 0.05, 0.2),
                    "lossAfter": draw2(rng, 1.5, 3.0),
                    "durationMs": draw_int(rng, 3000, 8000),
                })
            },
        },
        FaultTemplate {
            kind: EventKind::BitrateDrop,
            severity: Severity::Warn,
            summary_fn: |rng| {
                let pct = draw_int(rng, 25, 55);
                format!("Bitrate dropped {pct}%. Possible encoder adaptation or congestion.")
            },
            evidence_fn: |rng| {
                json!({
                    "bitrateBefore": draw2(rng, 8.0, 14.0),
                    "bitrateAfter": draw2(rng, 3.0, 7.0),
                    "dropPct": draw_int(rng, 25, 55),
                })
            },
        },
        FaultTemplate {
            kind: EventKind::FreezeDetected,
            severity: Severity::Critical,
            summary_fn: |rng| {
                let dur = draw2(rng, 1.5, 5.0);
                format!("Freeze detected for {dur}s. Duplicate frames observed.")
            },
            evidence_fn: |rng| {
                json!({
                    "freezeDurationMs": draw_int(rng, 1500, 5000),
                    "framesDuplicated": draw_int(rng, 30, 150),
                })
            },
        },
        FaultTemplate {
            kind: EventKind::AudioClipping,
            severity: Severity::Warn,
            summary_fn: |rng| {
                let ms = draw_int(rng, 200, 1200);
                format!("Audio clipping detected. Peak exceeded -1.0 dBFS for {ms}ms.")
            },
            evidence_fn: |rng| {
                json!({
                    "peakDbfs": draw2(rng, -0.8, 0.0),
                    "durationMs": draw_int(rng, 200, 1200),
                })
            },
        },
        FaultTemplate {
            kind: EventKind::PtsJump,
            severity: Severity::Warn,
            summary_fn: |rng| {
                let ms = draw_int(rng, 80, 500);
                format!("PTS discontinuity detected. Timestamp jumped {ms}ms.")
            },
            evidence_fn: |rng| {
                json!({
                    "jumpMs": draw_int(rng, 80, 500),
                    "direction": if rng.gen_bool(0.5) { "forward" } else { "backward" },
                })
            },
        },
        FaultTemplate {
            kind: EventKind::BlackFrames,
            severity: Severity::Warn,
            summary_fn: |rng| {
                let s = draw2(rng, 0.5, 3.0);
                format!("Black frames detected for {s}s. Possible signal loss.")
            },
            evidence_fn: |rng| {
                json!({
                    "durationMs": draw_int(rng, 500, 3000),
                    "avgLuma": draw2(rng, 0.0, 5.0),
                })
            },
        },
    ]
}
