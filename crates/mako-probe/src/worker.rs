// Probe worker
//
// One tokio task drives the simulation: a random initial delay, then ticks
// separated by a freshly drawn interval. Shutdown goes through a watch
// channel and interrupts both the pending initial delay and any armed
// interval, so no tick fires after the owner tore the probe down.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use mako_core::{Clock, SystemClock, User};
use mako_storage::{IncidentLifecycle, TelemetryStore};

use crate::generator::run_tick;

/// Simulator tunables. Defaults match the cadence the engine ships with.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// The first tick fires after a uniform draw from this range
    pub initial_delay: (Duration, Duration),
    /// Every later tick waits a fresh uniform draw from this range
    pub tick_interval: (Duration, Duration),
    /// Open incidents older than this are eligible for auto-resolution
    pub auto_resolve_age: Duration,
    /// Per-tick chance that one eligible incident resolves
    pub auto_resolve_probability: f64,
    /// User synthesized alerts are addressed to
    pub target_user_id: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            initial_delay: (Duration::from_secs(8), Duration::from_secs(15)),
            tick_interval: (Duration::from_secs(30), Duration::from_secs(60)),
            auto_resolve_age: Duration::from_secs(90),
            auto_resolve_probability: 0.3,
            target_user_id: User::current().id,
        }
    }
}

/// Simulated probe emitting incidents against the telemetry store.
pub struct Simulator {
    store: Arc<TelemetryStore>,
    lifecycle: Arc<IncidentLifecycle>,
    clock: Arc<dyn Clock>,
    config: ProbeConfig,
}

impl Simulator {
    pub fn new(store: Arc<TelemetryStore>, lifecycle: Arc<IncidentLifecycle>) -> Self {
        Self {
            store,
            lifecycle,
            clock: Arc::new(SystemClock),
            config: ProbeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spawns the worker task. The owner must call [`SimulatorHandle::shutdown`]
    /// on teardown or the task keeps ticking against the store.
    pub fn spawn(self) -> SimulatorHandle {
        self.spawn_with_rng(StdRng::from_entropy())
    }

    /// Seeded variant for deterministic runs.
    pub fn spawn_seeded(self, seed: u64) -> SimulatorHandle {
        self.spawn_with_rng(StdRng::seed_from_u64(seed))
    }

    fn spawn_with_rng(self, mut rng: StdRng) -> SimulatorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let initial = draw_delay(&mut rng, self.config.initial_delay);
            debug!(delay_ms = initial.as_millis() as u64, "probe arming initial delay");

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("probe shut down before first tick");
                    return;
                }
                _ = tokio::time::sleep(initial) => {}
            }

            loop {
                let outcome = run_tick(
                    &self.store,
                    &self.lifecycle,
                    self.clock.as_ref(),
                    &mut rng,
                    &self.config,
                );
                debug!(
                    incident_id = %outcome.incident_id,
                    auto_resolved = ?outcome.auto_resolved,
                    "probe tick complete"
                );

                let interval = draw_delay(&mut rng, self.config.tick_interval);
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("probe shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });

        SimulatorHandle { shutdown_tx, task }
    }
}

fn draw_delay(rng: &mut StdRng, (min, max): (Duration, Duration)) -> Duration {
    if max <= min {
        return min;
    }
    Duration::from_millis(rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64))
}

/// Owning handle for a spawned probe task.
pub struct SimulatorHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Signals shutdown. Cancels a pending initial delay or armed interval.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for the worker task to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_delay_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        let range = (Duration::from_secs(30), Duration::from_secs(60));
        for _ in 0..200 {
            let d = draw_delay(&mut rng, range);
            assert!(d >= range.0 && d <= range.1);
        }
    }

    #[test]
    fn test_draw_delay_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(6);
        let fixed = Duration::from_secs(10);
        assert_eq!(draw_delay(&mut rng, (fixed, fixed)), fixed);
    }

    #[test]
    fn test_default_config_matches_shipping_cadence() {
        let config = ProbeConfig::default();
        assert_eq!(config.initial_delay, (Duration::from_secs(8), Duration::from_secs(15)));
        assert_eq!(config.tick_interval, (Duration::from_secs(30), Duration::from_secs(60)));
        assert_eq!(config.auto_resolve_age, Duration::from_secs(90));
        assert_eq!(config.auto_resolve_probability, 0.3);
        assert_eq!(config.target_user_id, "u1");
    }
}
