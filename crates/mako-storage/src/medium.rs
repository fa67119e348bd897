// Key/Value Persistence Mediums
//
// The store persists each collection as one JSON string under a fixed key, so a
// medium only needs blocking get/set on string payloads. Two implementations:
// an in-memory map for tests and embedding, and a directory-backed medium that
// keeps one file per key for processes that should survive a restart.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use mako_core::{KeyValueMedium, QuinnError, Result};

/// Process-local medium backed by a mutex-guarded map.
///
/// This is the default for tests and for embedders that treat telemetry as
/// ephemeral. Payloads vanish when the medium is dropped.
#[derive(Debug, Default)]
pub struct InMemoryMedium {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueMedium for InMemoryMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| QuinnError::storage("telemetry medium mutex poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| QuinnError::storage("telemetry medium mutex poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed medium keeping one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    /// Creates the backing directory if it does not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| QuinnError::storage(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueMedium for FileMedium {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(QuinnError::storage(format!("read {}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| QuinnError::storage(format!("write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip() {
        let medium = InMemoryMedium::new();
        assert_eq!(medium.get("mako_quinn_incidents").unwrap(), None);

        medium.set("mako_quinn_incidents", "[]").unwrap();
        assert_eq!(
            medium.get("mako_quinn_incidents").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn in_memory_overwrites_existing_value() {
        let medium = InMemoryMedium::new();
        medium.set("k", "first").unwrap();
        medium.set("k", "second").unwrap();
        assert_eq!(medium.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn file_medium_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let medium = FileMedium::new(dir.path()).unwrap();

        assert_eq!(medium.get("mako_quinn_alerts").unwrap(), None);
        medium.set("mako_quinn_alerts", r#"[{"id":"al-1"}]"#).unwrap();
        assert_eq!(
            medium.get("mako_quinn_alerts").unwrap().as_deref(),
            Some(r#"[{"id":"al-1"}]"#)
        );

        // One file per key, named after the key.
        assert!(dir.path().join("mako_quinn_alerts.json").exists());
    }

    #[test]
    fn file_medium_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let medium = FileMedium::new(dir.path()).unwrap();
            medium.set("mako_quinn_events", "[1,2,3]").unwrap();
        }
        let reopened = FileMedium::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get("mako_quinn_events").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }
}
