//! System property access.
//!
//! Daemon and driver lifecycle state is observed by polling a key/value
//! store owned by the init system; the store is never the source of
//! commands, only of status. Hosts back [`PropertyStore`] with the real
//! platform store; [`MemoryPropertyStore`] serves tests and hosts without
//! one.

use std::collections::HashMap;
use std::sync::Mutex;

/// Key/value store polled for daemon and driver lifecycle state.
pub trait PropertyStore: Send + Sync {
    /// Reads a property, or `None` if it was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a property.
    fn set(&self, key: &str, value: &str);

    /// Per-key generation marker, bumped on every write. Lets a caller
    /// tell a freshly written value apart from one left over from an
    /// earlier run.
    fn serial(&self, key: &str) -> Option<u64>;
}

/// In-memory [`PropertyStore`] with per-key generation counters.
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, (String, u64)>,
    next_serial: u64,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.values.get(key).map(|(value, _)| value.clone())
    }

    fn set(&self, key: &str, value: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_serial += 1;
        let serial = inner.next_serial;
        inner.values.insert(key.to_string(), (value.to_string(), serial));
    }

    fn serial(&self, key: &str) -> Option<u64> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.values.get(key).map(|(_, serial)| *serial)
    }
}
