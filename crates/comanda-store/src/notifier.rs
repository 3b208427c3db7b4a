//! Push channel for store changes.

use comanda_commerce::backend::ChangeEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events a slow subscriber may fall behind by.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Fans change events out to every subscriber.
///
/// Publishing never blocks and never fails; events sent while nobody is
/// listening are dropped, which the poll fallback of a subscription covers.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let label = event_label(&event);
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(event = label, delivered, "change published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn event_label(event: &ChangeEvent) -> &'static str {
    match event {
        ChangeEvent::CatalogChanged => "catalog_changed",
        ChangeEvent::OrderInserted(_) => "order_inserted",
        ChangeEvent::OrderUpdated(_) => "order_updated",
    }
}
