// Mako Storage - bounded telemetry store and incident lifecycle
//
// Decision: Collections live whole in a key/value medium and are re-read on
//           every call. History is best-effort: storage trouble degrades to
//           seed data instead of erroring.
// Decision: Mutations only happen through TelemetryStore append/update and
//           IncidentLifecycle::update_status; callers never read-modify-write.

pub mod lifecycle;
pub mod medium;
pub mod seed;
pub mod store;

pub use lifecycle::{report_filename, IncidentLifecycle, IncidentReport};
pub use medium::{FileMedium, InMemoryMedium};
pub use store::{
    ChangeListener, TelemetryStore, ALERTS_KEY, EVENTS_KEY, INCIDENTS_KEY, MAX_ALERTS, MAX_EVENTS,
    MAX_INCIDENTS,
};
