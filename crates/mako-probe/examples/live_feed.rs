//! Live probe feed - run the simulator against an in-memory store
//!
//! Spawns the probe on a shortened cadence and prints the store totals every
//! time a write lands.
//!
//! Run with: cargo run -p mako-probe --example live_feed

use std::sync::Arc;
use std::time::Duration;

use mako_probe::{ProbeConfig, Simulator};
use mako_storage::{IncidentLifecycle, InMemoryMedium, TelemetryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = Arc::new(TelemetryStore::new(Arc::new(InMemoryMedium::new())));
    let lifecycle = Arc::new(IncidentLifecycle::new(store.clone()));
    let mut listener = store.subscribe();

    // Shortened cadence so the demo produces output quickly
    let config = ProbeConfig {
        initial_delay: (Duration::from_secs(1), Duration::from_secs(2)),
        tick_interval: (Duration::from_secs(3), Duration::from_secs(6)),
        auto_resolve_age: Duration::from_secs(10),
        ..ProbeConfig::default()
    };
    let probe = Simulator::new(store.clone(), lifecycle).with_config(config).spawn();

    println!("=== Mako probe simulator ===");
    println!("Watching the store for 30 seconds...\n");

    let deadline = tokio::time::sleep(Duration::from_secs(30));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = listener.changed() => {
                if !changed {
                    break;
                }
                let incidents = store.incidents();
                let open = incidents.iter().filter(|i| i.is_active()).count();
                println!(
                    "{} incidents ({open} active), {} events, {} alerts",
                    incidents.len(),
                    store.events().len(),
                    store.alerts().len(),
                );
            }
        }
    }

    probe.shutdown();
    probe.join().await;
    println!("\nDone.");
    Ok(())
}
