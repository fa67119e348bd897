// Core traits for pluggable backends
//
// These seams let the store and the probe run against different backends:
// - In-memory medium for examples and testing
// - File-backed medium for a real deployment
// - A manual clock for deterministic time in tests

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::Result;

// ============================================================================
// KeyValueMedium - durable storage with string get/set semantics
// ============================================================================

/// Durable key-value medium with string semantics.
///
/// Every store operation is one synchronous round-trip: reads parse the whole
/// persisted collection, writes replace it (last write wins). There are no
/// partial writes to observe.
pub trait KeyValueMedium: Send + Sync {
    /// Read the raw payload stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the payload stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// Clock - injectable time source
// ============================================================================

/// Injectable time source
///
/// Production code uses [`SystemClock`]; tests drive a manual clock so age
/// thresholds and resolution timestamps are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Intended for tests that need to age
/// incidents past thresholds without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.lock() = to;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        *now = *now + by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
