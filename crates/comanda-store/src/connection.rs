//! Owned connection to the data store.
//!
//! One `Connection` is opened per process and handed to whatever needs the
//! store. It owns the subscriptions started through it and shuts them down,
//! then flushes the store, on [`Connection::close`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use comanda_commerce::backend::{ChangeListener, DataStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::subscription::DEFAULT_POLL_INTERVAL;
use crate::{CatalogSubscription, MemoryStore, RetryPolicy, RetryingStore, StoreDocument};

/// How to open a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// JSON store document. `None` keeps everything in memory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Write a sample document when `path` does not exist yet.
    #[serde(default)]
    pub create_if_missing: bool,
    /// Reconciliation poll interval for catalog subscriptions, in seconds.
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
    /// Retries for transient fetch failures.
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,
}

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_fetch_retries() -> u32 {
    2
}

impl ConnectionConfig {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            create_if_missing: false,
            poll_interval_secs: default_poll_secs(),
            fetch_retries: default_fetch_retries(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// An open store plus the subscriptions started on it.
pub struct Connection {
    store: Arc<MemoryStore>,
    reader: Arc<RetryingStore>,
    subscriptions: Vec<CatalogSubscription>,
    config: ConnectionConfig,
}

impl Connection {
    /// Open the store described by `config`.
    pub fn open(config: ConnectionConfig) -> Result<Self, StoreError> {
        let store = match &config.path {
            Some(path) if path.exists() => MemoryStore::load(path)?,
            Some(path) if config.create_if_missing => {
                let document = StoreDocument::sample();
                document.save(path)?;
                info!(path = %path.display(), "created sample store");
                MemoryStore::with_file(document, path)
            }
            Some(path) => {
                return Err(StoreError::Unavailable(format!(
                    "store file {} does not exist",
                    path.display()
                )))
            }
            None => MemoryStore::new(StoreDocument::default()),
        };
        Ok(Self::from_store(store, config))
    }

    /// Wrap an already built store.
    pub fn from_store(store: MemoryStore, config: ConnectionConfig) -> Self {
        let store = Arc::new(store);
        let policy = RetryPolicy::new(config.fetch_retries);
        let reader = Arc::new(RetryingStore::new(store.clone(), policy));
        Self {
            store,
            reader,
            subscriptions: Vec::new(),
            config,
        }
    }

    /// The store as the ordering core sees it: fetches are retried, writes
    /// are not.
    pub fn data_store(&self) -> Arc<dyn DataStore> {
        self.reader.clone()
    }

    /// Direct access for admin catalog edits.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Start a catalog subscription delivering to `listener`.
    pub fn subscribe(&mut self, listener: Arc<dyn ChangeListener>) {
        let subscription = CatalogSubscription::spawn(
            self.data_store(),
            self.store.notifier().subscribe(),
            listener,
            self.config.poll_interval(),
        );
        self.subscriptions.push(subscription);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Stop every subscription, then flush and close the store.
    pub async fn close(self) -> Result<(), StoreError> {
        let count = self.subscriptions.len();
        for subscription in self.subscriptions {
            subscription.close().await;
        }
        self.store.close()?;
        info!(subscriptions = count, "connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comanda_commerce::catalog::CatalogSnapshot;
    use comanda_commerce::storefront::CatalogCell;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig::file(dir.path().join("store.json"));
        assert!(matches!(
            Connection::open(config),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_open_creates_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("store.json");
        let config = ConnectionConfig {
            create_if_missing: true,
            ..ConnectionConfig::file(&path)
        };

        let connection = Connection::open(config).unwrap();
        assert!(path.exists());

        let snapshot = CatalogSnapshot::fetch(connection.data_store().as_ref())
            .await
            .unwrap();
        assert_eq!(snapshot.settings.restaurant_name, "Corner Cafe");
        connection.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_stops_subscriptions_and_store() {
        let mut connection = Connection::open(ConnectionConfig::in_memory()).unwrap();
        let cell = Arc::new(CatalogCell::new());
        connection.subscribe(cell.clone());
        assert_eq!(connection.subscription_count(), 1);

        let store = connection.store().clone();
        connection.close().await.unwrap();

        assert!(!store.is_open());
        assert_eq!(
            store.fetch_settings().await.unwrap_err(),
            StoreError::Closed
        );
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: ConnectionConfig = serde_json::from_str(r#"{"path": "store.json"}"#).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.fetch_retries, 2);
        assert!(!config.create_if_missing);
    }
}
