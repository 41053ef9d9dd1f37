//! Storage backend abstraction.
//!
//! The mirror treats the underlying key-value store as an opaque synchronous
//! interface. Backends own persistence and ordering; the mirror only reads
//! them through this trait and writes through before updating its own state.

use std::sync::Arc;

use crate::core::Result;

mod memory;

pub use memory::MemoryStorage;

/// A synchronous key-value store the mirror can wrap.
///
/// Implementations must be shareable across tasks. All operations are
/// fallible so that real backends can surface I/O failures; the mirror
/// propagates those unmodified and never retries. A missing key is `Ok(None)`
/// at every layer, never an error.
pub trait StorageBackend: Send + Sync {
    /// Returns the value for `key`, or `None` if the key is not present.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn clear(&self) -> Result<()>;

    /// Returns the key at `index` in the backend's own ordering, or `None`
    /// if `index` is out of range.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn key(&self, index: usize) -> Result<Option<String>>;

    /// Returns every key currently present, in the backend's own ordering.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn keys(&self) -> Result<Vec<String>>;

    /// Returns the number of keys currently present.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn len(&self) -> Result<usize>;

    /// Returns whether the backend holds no keys.
    ///
    /// # Errors
    /// Returns the backend's own failure, if any.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// A shareable handle to a storage backend.
///
/// Cloning the handle does not copy the store; all clones observe the same
/// underlying data, the same way a browser storage area is shared between
/// windows.
pub type SharedStorage = Arc<dyn StorageBackend>;
