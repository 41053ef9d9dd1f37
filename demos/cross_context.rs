//! Two mirrors over one shared storage area, reconciling via change events.
//!
//! Run with `RUST_LOG=debug cargo run --example cross_context` to watch the
//! reconciliation logging.

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kvmirror::{
    mirror::{ChangeNotifier, MirrorStore},
    storage::{MemoryStorage, StorageBackend},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // One storage area, seen from two "contexts": the mirror's own handle and
    // a clone standing in for another window mutating the same store.
    let storage = MemoryStorage::with_entries([("theme", "dark")]);
    let other_context = storage.clone();

    let notifier = ChangeNotifier::new();
    let (mirror, _listener) = MirrorStore::with_notifier(Arc::new(storage), &notifier)?;

    let mut theme = mirror.get_stream("theme");
    info!(replayed = ?theme.next().await, "subscribed to 'theme'");

    mirror.set("theme", "light")?;
    info!(emitted = ?theme.next().await, "after direct write");

    // Out-of-band write: the other context changes the store, then announces
    // that a change happened somewhere.
    other_context.set("theme", "solarized")?;
    notifier.notify(None);

    sleep(Duration::from_millis(50)).await;
    info!(emitted = ?theme.next().await, "after out-of-band write and sync");

    info!(keys = mirror.len(), "mirror in sync");
    Ok(())
}
