//! In-memory key/value cache.

use crate::capabilities::KeyValueCache;
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe string cache backed by a `HashMap`.
///
/// Values live for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        } else {
            tracing::warn!(key, "Cache lock poisoned, dropping write");
        }
    }
}
