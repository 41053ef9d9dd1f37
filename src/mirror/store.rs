use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::Stream;
use tracing::{debug, instrument};

use crate::core::Result;
use crate::storage::{SharedStorage, StorageBackend};

use super::channel::ValueChannel;

/// A reactive mirror of a storage backend.
///
/// Owns one [`ValueChannel`] per known key and keeps them consistent with the
/// backend: direct writes go through the backend first and are then pushed
/// into the matching channel, while out-of-band writes are folded in by
/// [`sync`](MirrorStore::sync) when a change notification arrives. The
/// backend is ground truth; the channel map is derived state and may lag it
/// between an external mutation and the next reconciliation.
#[derive(Clone)]
pub struct MirrorStore {
    backend: SharedStorage,

    channels: Arc<RwLock<HashMap<String, ValueChannel>>>,
}

impl MirrorStore {
    /// Creates a mirror over `backend`, pre-populated with one channel per
    /// key currently present, each holding that key's current value.
    ///
    /// The backend handle is kept as the default reconciliation target. To
    /// also react to external-change notifications, use
    /// [`with_notifier`](MirrorStore::with_notifier) or attach a listener
    /// afterwards with [`listen`](MirrorStore::listen).
    ///
    /// # Errors
    /// Propagates any failure from enumerating or reading the backend.
    pub fn new(backend: SharedStorage) -> Result<Self> {
        let mut channels = HashMap::new();

        for key in backend.keys()? {
            let value = backend.get(&key)?;
            channels.insert(key, ValueChannel::new(value));
        }

        debug!(keys = channels.len(), "mirror populated from backend");

        Ok(Self {
            backend,
            channels: Arc::new(RwLock::new(channels)),
        })
    }

    /// Returns the backend's current value for `key`.
    ///
    /// This is an authoritative read-through: the answer comes from the
    /// backend regardless of the channel map's state. As a side effect the
    /// key's channel is materialized (initialized to absent) if it does not
    /// exist yet, matching [`get_stream`](MirrorStore::get_stream).
    ///
    /// # Errors
    /// Propagates any failure from the backend read.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.channels_write()
            .entry(key.to_string())
            .or_insert_with(|| ValueChannel::new(None));

        self.backend.get(key)
    }

    /// Returns a live stream of `key`'s value.
    ///
    /// The stream immediately yields the channel's current value, then every
    /// update made through [`set`](MirrorStore::set) or reconciliation. A key
    /// that never existed and is never written yields a single absent value
    /// and then stays pending; the stream never completes, even after the
    /// key's channel is torn down by [`remove`](MirrorStore::remove) or
    /// reconciliation.
    pub fn get_stream(
        &self,
        key: &str,
    ) -> impl Stream<Item = Option<String>> + Send + Unpin + use<> {
        let mut channels = self.channels_write();
        let channel = channels
            .entry(key.to_string())
            .or_insert_with(|| ValueChannel::new(None));

        channel.watch()
    }

    /// Writes `value` for `key`: backend first, then the key's channel.
    ///
    /// The ordering is load-bearing: the backend is ground truth, so it must
    /// hold the value before any subscriber can observe it from the mirror.
    ///
    /// # Errors
    /// Propagates any failure from the backend write; on failure the channel
    /// map is left untouched.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.backend.set(key, value)?;

        let mut channels = self.channels_write();
        Self::push_into(&mut channels, key, Some(value.to_string()));

        Ok(())
    }

    /// Removes `key` from the backend, then tears its channel out of the map.
    ///
    /// Existing subscribers are orphaned: they receive no terminal emission
    /// and their streams do not complete, they simply stop receiving pushes.
    ///
    /// # Errors
    /// Propagates any failure from the backend removal.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key)?;
        self.channels_write().remove(key);

        Ok(())
    }

    /// Empties the backend, then drops every channel.
    ///
    /// # Errors
    /// Propagates any failure from clearing the backend.
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()?;
        self.channels_write().clear();

        Ok(())
    }

    /// Returns the backend's key at `index`, in the backend's own ordering,
    /// or `None` if `index` is out of range.
    ///
    /// # Errors
    /// Propagates any failure from the backend.
    pub fn key(&self, index: usize) -> Result<Option<String>> {
        self.backend.key(index)
    }

    /// Number of channels the mirror currently owns.
    ///
    /// Matches the backend's key count once synchronized, but may differ
    /// between an external mutation and the next reconciliation.
    pub fn len(&self) -> usize {
        self.channels_read().len()
    }

    /// Returns whether the mirror currently owns no channels.
    pub fn is_empty(&self) -> bool {
        self.channels_read().is_empty()
    }

    /// Reconciles the mirror against the backend captured at construction.
    ///
    /// # Errors
    /// Propagates any failure from reading the backend.
    pub fn sync(&self) -> Result<()> {
        self.sync_from(self.backend.as_ref())
    }

    /// Reconciles the mirror against `source`'s current keys and values.
    ///
    /// Channels for keys no longer present in `source` are torn down, then
    /// every key present gets its current value pushed into the map, creating
    /// channels as needed. The push is unconditional: subscribers of
    /// still-present keys receive a redundant emission on every
    /// reconciliation even when nothing changed for their key.
    ///
    /// # Errors
    /// Propagates any failure from reading `source`; a partially applied
    /// reconciliation is repaired by the next one.
    #[instrument(skip_all)]
    pub fn sync_from(&self, source: &dyn StorageBackend) -> Result<()> {
        let keys = source.keys()?;
        let mut channels = self.channels_write();

        let before = channels.len();

        // Teardown must fully complete before repopulation so a key that was
        // removed and re-added between reconciliations gets a fresh channel
        // instead of keeping its old one.
        channels.retain(|key, _| keys.iter().any(|k| k == key));

        let stale = before - channels.len();

        for key in &keys {
            let value = source.get(key)?;
            Self::push_into(&mut channels, key, value);
        }

        debug!(keys = keys.len(), stale, "mirror reconciled");

        Ok(())
    }

    /// Pushes `value` into `key`'s channel, creating the channel holding
    /// `value` when none exists yet.
    fn push_into(channels: &mut HashMap<String, ValueChannel>, key: &str, value: Option<String>) {
        match channels.get(key) {
            Some(channel) => channel.push(value),
            None => {
                channels.insert(key.to_string(), ValueChannel::new(value));
            }
        }
    }

    fn channels_read(&self) -> RwLockReadGuard<'_, HashMap<String, ValueChannel>> {
        match self.channels.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn channels_write(&self) -> RwLockWriteGuard<'_, HashMap<String, ValueChannel>> {
        match self.channels.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for MirrorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorStore")
            .field("keys", &self.len())
            .finish()
    }
}
