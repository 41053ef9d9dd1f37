use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, instrument, warn};

use crate::core::Result;
use crate::storage::SharedStorage;

use super::{ChangeNotifier, MirrorStore, SyncListener, events::StorageEvent};

impl MirrorStore {
    /// Creates a mirror over `backend` and registers it for external-change
    /// notifications in one step.
    ///
    /// Every event published on `notifier` triggers a reconciliation: against
    /// the store the event names, or against `backend` when the event names
    /// none. The returned [`SyncListener`] owns the registration; dropping it
    /// stops event-driven reconciliation without affecting the mirror itself.
    ///
    /// # Errors
    /// Propagates any failure from enumerating or reading the backend.
    pub fn with_notifier(
        backend: SharedStorage,
        notifier: &ChangeNotifier,
    ) -> Result<(Self, SyncListener)> {
        let store = Self::new(backend)?;
        let listener = store.listen(notifier);

        Ok((store, listener))
    }

    /// Registers this mirror for external-change notifications.
    ///
    /// Reconciliation runs on a background task as events arrive. A listener
    /// that falls behind the event buffer resynchronizes against the default
    /// backend, which subsumes whatever the missed events described.
    #[instrument(skip_all)]
    pub fn listen(&self, notifier: &ChangeNotifier) -> SyncListener {
        let store = self.clone();
        let mut events = notifier.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.apply_event(event),

                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "lagged behind storage events, full resync");
                        if let Err(error) = store.sync() {
                            warn!("resync after event lag failed: {error}");
                        }
                    }

                    Err(RecvError::Closed) => break,
                }
            }
        });

        SyncListener { task }
    }

    fn apply_event(&self, event: StorageEvent) {
        let result = match event.store {
            Some(source) => self.sync_from(source.as_ref()),
            None => self.sync(),
        };

        if let Err(error) = result {
            warn!("reconciliation after storage event failed: {error}");
        }
    }
}
