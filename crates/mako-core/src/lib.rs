// Quinn Telemetry Core
//
// This crate provides the domain types of the Quinn incident/event telemetry
// engine and the seams the rest of the workspace plugs into.
//
// Key design decisions:
// - Entities serialize camelCase; that is the persisted layout and the export
//   format consumed by reporting
// - Status transitions are forward-only (open -> ack -> resolved); the
//   lifecycle controller in mako-storage enforces this
// - Storage is a string key-value contract (KeyValueMedium); implementations
//   live in mako-storage so this crate stays medium-agnostic
// - Time comes from an injectable Clock so aging rules are testable

pub mod alert;
pub mod error;
pub mod event;
pub mod incident;
pub mod traits;
pub mod user;

// Re-exports for convenience
pub use alert::Alert;
pub use error::{QuinnError, Result};
pub use event::{EventKind, TelemetryEvent};
pub use incident::{Incident, IncidentStatus, Severity};
pub use traits::{Clock, KeyValueMedium, ManualClock, SystemClock};
pub use user::{User, UserRole};
