//! In-memory cache for tests and one-shot runs

use crate::StoreError;
use folio_domain::traits::ResultCache;
use folio_domain::{EntryKind, Fingerprint};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// `ResultCache` backed by a shared map
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<(EntryKind, Fingerprint), String>>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    type Error = StoreError;

    fn get(&self, kind: EntryKind, key: &Fingerprint) -> Result<Option<String>, Self::Error> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(&(kind, key.clone())).cloned())
    }

    fn put(&self, kind: EntryKind, key: &Fingerprint, contents: &str) -> Result<(), Self::Error> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert((kind, key.clone()), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent_is_none() {
        let cache = MemoryCache::new();
        let key = Fingerprint::of_bytes(b"x");
        assert_eq!(cache.get(EntryKind::Text, &key).unwrap(), None);
        assert!(!cache.contains(EntryKind::Text, &key).unwrap());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MemoryCache::new();
        let key = Fingerprint::of_bytes(b"x");

        cache.put(EntryKind::Csv, &key, "a").unwrap();
        cache.put(EntryKind::Csv, &key, "b").unwrap();

        assert_eq!(cache.get(EntryKind::Csv, &key).unwrap().as_deref(), Some("b"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_kinds_are_separate() {
        let cache = MemoryCache::new();
        let key = Fingerprint::of_bytes(b"x");

        cache.put(EntryKind::Csv, &key, "csv").unwrap();
        assert!(cache.get(EntryKind::Json, &key).unwrap().is_none());
    }

    #[test]
    fn test_len_survives_poisoned_lock() {
        let cache = MemoryCache::new();
        let key = Fingerprint::of_bytes(b"x");
        cache.put(EntryKind::Text, &key, "kept").unwrap();

        let shared = cache.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.entries.lock().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(cache.entries.is_poisoned());

        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
        assert_eq!(cache.get(EntryKind::Text, &key).unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        let key = Fingerprint::of_bytes(b"x");

        other.put(EntryKind::Text, &key, "shared").unwrap();
        assert!(!cache.is_empty());
    }
}
