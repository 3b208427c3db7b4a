//! Catalog subscription: pushed change events plus a periodic poll.
//!
//! Push events trigger an immediate refresh. The poll catches anything the
//! push channel missed (no subscriber at the time, a lagged receiver, a
//! dropped connection), so listeners converge on the latest catalog either
//! way. Every refresh fetches a whole new snapshot; nothing is merged.

use std::sync::Arc;
use std::time::Duration;

use comanda_commerce::backend::{ChangeEvent, ChangeListener, DataStore};
use comanda_commerce::catalog::CatalogSnapshot;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Default time between reconciliation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// A running subscription task.
///
/// Dropping the handle without calling [`CatalogSubscription::close`] leaves
/// the task running until the notifier goes away.
#[derive(Debug)]
pub struct CatalogSubscription {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CatalogSubscription {
    /// Start the task. The first refresh runs immediately.
    pub fn spawn(
        store: Arc<dyn DataStore>,
        events: broadcast::Receiver<ChangeEvent>,
        listener: Arc<dyn ChangeListener>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(store, events, listener, poll_interval, shutdown_rx));
        Self { shutdown, task }
    }

    /// Stop the task and wait for it to finish.
    pub async fn close(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "catalog subscription task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run(
    store: Arc<dyn DataStore>,
    mut events: broadcast::Receiver<ChangeEvent>,
    listener: Arc<dyn ChangeListener>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(poll_interval.max(Duration::from_millis(10)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                refresh(store.as_ref(), listener.as_ref()).await;
            }
            event = events.recv() => match event {
                Ok(ChangeEvent::CatalogChanged) => {
                    refresh(store.as_ref(), listener.as_ref()).await;
                    ticker.reset();
                }
                Ok(order_event) => listener.on_order_event(&order_event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "change events lagged, refreshing");
                    refresh(store.as_ref(), listener.as_ref()).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    debug!("catalog subscription stopped");
}

async fn refresh(store: &dyn DataStore, listener: &dyn ChangeListener) {
    match CatalogSnapshot::fetch(store).await {
        Ok(snapshot) => listener.on_catalog_changed(snapshot),
        Err(e) => listener.on_catalog_error(&e),
    }
}
