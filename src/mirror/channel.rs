use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

/// Buffered updates per subscriber before lag skips to newer values.
const CHANNEL_CAPACITY: usize = 64;

/// The replay-latest observable cell for a single key.
///
/// Holds the key's current value (or absence) and a broadcast list of
/// subscribers. Every push is delivered to every active subscriber, including
/// pushes that repeat the previous value; de-duplication is the caller's
/// decision, not the channel's.
#[derive(Clone)]
pub struct ValueChannel {
    current: Arc<RwLock<Option<String>>>,
    notify: broadcast::Sender<Option<String>>,
}

impl ValueChannel {
    /// Creates a channel holding `initial` as its current value.
    pub fn new(initial: Option<String>) -> Self {
        let (notify, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            current: Arc::new(RwLock::new(initial)),
            notify,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> Option<String> {
        self.current_read().clone()
    }

    /// Replaces the current value and notifies every active subscriber.
    ///
    /// Never fails; a channel with no subscribers simply records the value.
    pub fn push(&self, value: Option<String>) {
        {
            let mut current = self.current_write();
            *current = value.clone();
        }

        let _ = self.notify.send(value);
    }

    /// Subscribes to this channel.
    ///
    /// The stream immediately yields the current value, then yields every
    /// subsequent push. It never completes: once the owning store tears the
    /// channel down, the stream goes silent instead of ending, so orphaned
    /// subscribers pend rather than observing a termination.
    pub fn watch(&self) -> impl Stream<Item = Option<String>> + Send + Unpin + use<> {
        // Register before snapshotting so a push landing in between is
        // delivered rather than lost; the worst case is one duplicate.
        let updates = self.notify.subscribe();
        let current = self.get();

        // The sender clone keeps the broadcast channel open after the store
        // drops this channel, which is what keeps orphaned streams pending.
        let keepalive = self.notify.clone();

        tokio_stream::once(current).chain(BroadcastStream::new(updates).filter_map(
            move |update| {
                let _open = &keepalive;
                // A lagged subscriber skips to newer values, which is
                // consistent with latest-value-wins.
                update.ok()
            },
        ))
    }

    fn current_read(&self) -> RwLockReadGuard<'_, Option<String>> {
        match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn current_write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for ValueChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueChannel")
            .field("value", &self.get())
            .finish()
    }
}
