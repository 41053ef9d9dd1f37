use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::Result;

use super::StorageBackend;

/// An insertion-ordered in-memory storage backend.
///
/// Clones share the underlying entries, so one `MemoryStorage` handed to
/// several owners behaves like a single storage area seen from several
/// execution contexts. `key(index)` follows insertion order, and updating an
/// existing key keeps its position, matching the web storage interface this
/// models. Operations never fail.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<Vec<(String, String)>>>,
}

impl MemoryStorage {
    /// Creates an empty storage area.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage area pre-seeded with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    fn entries_read(&self) -> RwLockReadGuard<'_, Vec<(String, String)>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn entries_write(&self) -> RwLockWriteGuard<'_, Vec<(String, String)>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries_read();
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries_write();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries_write().retain(|(k, _)| k != key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries_write().clear();
        Ok(())
    }

    fn key(&self, index: usize) -> Result<Option<String>> {
        let entries = self.entries_read();
        Ok(entries.get(index).map(|(k, _)| k.clone()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries_read();
        Ok(entries.iter().map(|(k, _)| k.clone()).collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries_read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let other_context = storage.clone();

        other_context.set("foo", "bar").unwrap();

        assert_eq!(storage.get("foo").unwrap().as_deref(), Some("bar"));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn set_keeps_insertion_position() {
        let storage = MemoryStorage::with_entries([("foo", "bar"), ("bar", "foo")]);

        storage.set("foo", "updated").unwrap();

        assert_eq!(storage.key(0).unwrap().as_deref(), Some("foo"));
        assert_eq!(storage.key(1).unwrap().as_deref(), Some("bar"));
        assert_eq!(storage.get("foo").unwrap().as_deref(), Some("updated"));
    }

    #[test]
    fn key_out_of_range_is_absent() {
        let storage = MemoryStorage::with_entries([("foo", "bar")]);

        assert_eq!(storage.key(5).unwrap(), None);
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let storage = MemoryStorage::with_entries([("foo", "bar")]);

        storage.remove("nope").unwrap();

        assert_eq!(storage.len().unwrap(), 1);
    }
}
