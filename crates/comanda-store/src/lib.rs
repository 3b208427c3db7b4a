//! Data store for Comanda.
//!
//! A JSON-document store that implements the ordering core's
//! [`DataStore`](comanda_commerce::backend::DataStore) contract, with a push
//! channel for changes and a catalog subscription that combines pushed
//! events with a reconciliation poll.
//!
//! # Example
//!
//! ```rust,ignore
//! use comanda_store::{Connection, ConnectionConfig};
//! use comanda_commerce::storefront::{CatalogCell, Storefront};
//!
//! let mut connection = Connection::open(ConnectionConfig::file("store.json"))?;
//! let cell = Arc::new(CatalogCell::new());
//! connection.subscribe(cell.clone());
//!
//! let storefront = Storefront::open(connection.data_store().as_ref()).await?;
//! // ...
//! connection.close().await?;
//! ```

mod connection;
mod document;
mod error;
mod memory;
mod notifier;
mod retry;
mod subscription;

pub use connection::{Connection, ConnectionConfig};
pub use document::StoreDocument;
pub use error::DocumentError;
pub use memory::MemoryStore;
pub use notifier::{ChangeNotifier, DEFAULT_CHANNEL_CAPACITY};
pub use retry::{BackoffStrategy, RetryPolicy, RetryingStore};
pub use subscription::{CatalogSubscription, DEFAULT_POLL_INTERVAL};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CatalogSubscription, ChangeNotifier, Connection, ConnectionConfig, MemoryStore,
        RetryPolicy, RetryingStore, StoreDocument,
    };
}
