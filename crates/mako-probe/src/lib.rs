// Mako Probe - synthetic fault simulator
//
// Decision: The probe is an explicit synthetic-data stand-in for a future
//           detector; templates carry the numeric ranges a real probe reports
// Decision: Auto-resolution funnels through the lifecycle controller so a
//           resolved incident always stamps ended_at and acks its alerts

pub mod generator;
pub mod templates;
pub mod worker;

pub use generator::{run_tick, synthesize, SyntheticBatch, TickOutcome};
pub use templates::{catalog, FaultTemplate, MonitoredLine, MonitoredSession, LINES, SESSIONS};
pub use worker::{ProbeConfig, Simulator, SimulatorHandle};
