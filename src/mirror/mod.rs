//! Reactive mirror over a storage backend.
//!
//! Exposes a live stream per key, writes through to the backend, and
//! reconciles with it when external-change notifications arrive.

mod channel;
mod events;
mod listening;
mod store;

#[cfg(test)]
mod tests;

pub use channel::ValueChannel;
pub use events::{ChangeNotifier, StorageEvent, SyncListener};
pub use store::MirrorStore;
