use tokio::{sync::broadcast, task::JoinHandle};

use crate::storage::SharedStorage;

/// Buffered events per listener before lag forces a full resync.
const EVENT_CAPACITY: usize = 64;

/// Notification that a storage area changed outside of a mirror's own writes.
///
/// `store` optionally names the storage area that changed; `None` means
/// "assume the listener's default backend changed".
#[derive(Clone)]
pub struct StorageEvent {
    /// The storage area that changed, when the publisher knows it.
    pub store: Option<SharedStorage>,
}

/// Publisher side of the external-change notification channel.
///
/// Cloneable; every mirror listening on the same notifier receives every
/// event and reconciles independently. Publishing with no listeners
/// registered is a no-op.
#[derive(Clone)]
pub struct ChangeNotifier {
    events: broadcast::Sender<StorageEvent>,
}

impl ChangeNotifier {
    /// Creates a notifier with no listeners yet.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self { events }
    }

    /// Publishes a change event to every registered listener.
    ///
    /// Pass the changed storage area when it is known; pass `None` to let
    /// each listener reconcile against its own default backend.
    pub fn notify(&self, store: Option<SharedStorage>) {
        let _ = self.events.send(StorageEvent { store });
    }

    pub(super) fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a mirror's change-notification subscription.
///
/// Dropping the handle deterministically unregisters the mirror: the
/// listener task is aborted and no further events trigger reconciliation.
pub struct SyncListener {
    pub(super) task: JoinHandle<()>,
}

impl Drop for SyncListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
