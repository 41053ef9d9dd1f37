//! Kvmirror - Reactive mirror over a synchronous key-value store.
//!
//! Kvmirror keeps a live, observable view of an external key-value store:
//! every key gets a replay-latest stream of its value, kept consistent with
//! writes made through the mirror itself and with out-of-band writes made in
//! other contexts sharing the same store. The main pieces are:
//!
//! - Per-key value channels with replay-latest subscription semantics
//! - Write-through storage access (backend first, mirror second)
//! - Reconciliation against the backend's current keys on change events
//! - A pluggable [`StorageBackend`](storage::StorageBackend) trait
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use kvmirror::{mirror::MirrorStore, storage::MemoryStorage};
//!
//! # fn main() -> kvmirror::Result<()> {
//! let backend = MemoryStorage::with_entries([("foo", "bar")]);
//! let mirror = MirrorStore::new(Arc::new(backend))?;
//!
//! assert_eq!(mirror.get("foo")?.as_deref(), Some("bar"));
//! mirror.set("foo", "baz")?;
//! # Ok(())
//! # }
//! ```

/// Core error types and result aliases.
pub mod core;

/// Storage backend abstraction and in-memory implementation.
pub mod storage;

/// Reactive mirror, per-key channels, and change notifications.
pub mod mirror;

/// Re-exported core types for convenience.
pub use core::{Result, StorageError};
