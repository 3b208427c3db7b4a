//! In-memory data store, optionally mirrored to a JSON file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use comanda_commerce::backend::{ChangeEvent, DataStore, StoreError};
use comanda_commerce::catalog::{Category, PersonalizationGroup, Product, Promotion};
use comanda_commerce::checkout::{AppSettings, Order, OrderPatch};
use comanda_commerce::{OptionId, OrderId, PersonalizationId, ProductId};
use tracing::{debug, info, warn};

use crate::{ChangeNotifier, StoreDocument};

/// A data store held in memory.
///
/// When backed by a file, every successful write is flushed before it is
/// acknowledged; a failed flush undoes the write. Catalog edits publish
/// [`ChangeEvent::CatalogChanged`], order writes publish the stored record.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreDocument>,
    path: Option<PathBuf>,
    notifier: ChangeNotifier,
    open: AtomicBool,
}

impl MemoryStore {
    /// A store that lives only in memory.
    pub fn new(document: StoreDocument) -> Self {
        Self {
            state: RwLock::new(document),
            path: None,
            notifier: ChangeNotifier::new(),
            open: AtomicBool::new(true),
        }
    }

    /// A store mirrored to `path`. The file is created on first flush.
    pub fn with_file(document: StoreDocument, path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::new(document)
        }
    }

    /// Load a store from `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = StoreDocument::load(&path)?;
        info!(path = %path.display(), orders = document.orders.len(), "store loaded");
        Ok(Self::with_file(document, path))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Copy of the current document.
    pub fn document(&self) -> StoreDocument {
        self.read().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Flush and refuse every later call.
    pub fn close(&self) -> Result<(), StoreError> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let state = self.read();
        self.flush(&state)?;
        debug!("store closed");
        Ok(())
    }

    /// Toggle a product's availability.
    pub fn set_product_availability(&self, id: &ProductId, available: bool) -> Result<(), StoreError> {
        self.edit_catalog(|doc| {
            let product = doc
                .products
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            product.available = available;
            Ok(())
        })
    }

    /// Toggle one personalization option's availability.
    pub fn set_option_availability(
        &self,
        group_id: &PersonalizationId,
        option_id: &OptionId,
        available: bool,
    ) -> Result<(), StoreError> {
        self.edit_catalog(|doc| {
            let option = doc
                .personalization_groups
                .iter_mut()
                .find(|g| &g.id == group_id)
                .and_then(|g| g.options.iter_mut().find(|o| &o.id == option_id))
                .ok_or_else(|| StoreError::NotFound(format!("{}/{}", group_id, option_id)))?;
            option.available = available;
            Ok(())
        })
    }

    /// Insert or replace a product.
    pub fn upsert_product(&self, product: Product) -> Result<(), StoreError> {
        self.edit_catalog(|doc| {
            match doc.products.iter_mut().find(|p| p.id == product.id) {
                Some(existing) => *existing = product,
                None => doc.products.push(product),
            }
            Ok(())
        })
    }

    /// Insert or replace a promotion. New promotions are stamped with the
    /// current time so they sort after older ones.
    pub fn upsert_promotion(&self, mut promotion: Promotion) -> Result<(), StoreError> {
        self.edit_catalog(|doc| {
            match doc.promotions.iter_mut().find(|p| p.id == promotion.id) {
                Some(existing) => {
                    promotion.created_at = promotion.created_at.or(existing.created_at);
                    *existing = promotion;
                }
                None => {
                    promotion.created_at = promotion.created_at.or_else(|| Some(Utc::now()));
                    doc.promotions.push(promotion);
                }
            }
            Ok(())
        })
    }

    /// Replace the restaurant settings.
    pub fn set_settings(&self, settings: AppSettings) -> Result<(), StoreError> {
        self.edit_catalog(|doc| {
            doc.settings = settings;
            Ok(())
        })
    }

    fn edit_catalog(
        &self,
        edit: impl FnOnce(&mut StoreDocument) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        {
            let mut state = self.write();
            let before = state.clone();
            edit(&mut state)?;
            if let Err(e) = self.flush(&state) {
                *state = before;
                return Err(e);
            }
        }
        self.notifier.publish(ChangeEvent::CatalogChanged);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn flush(&self, state: &StoreDocument) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => state.save(path).map_err(|e| {
                warn!(path = %path.display(), error = %e, "store flush failed");
                StoreError::from(e)
            }),
            None => Ok(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreDocument> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreDocument> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        self.ensure_open()?;
        Ok(self.read().products.clone())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.ensure_open()?;
        Ok(self.read().categories.clone())
    }

    async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError> {
        self.ensure_open()?;
        Ok(self.read().personalization_groups.clone())
    }

    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        self.ensure_open()?;
        let mut promotions: Vec<Promotion> = self
            .read()
            .promotions
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect();
        promotions.sort_by_key(|p| p.created_at);
        Ok(promotions)
    }

    async fn fetch_settings(&self) -> Result<AppSettings, StoreError> {
        self.ensure_open()?;
        Ok(self.read().settings.clone())
    }

    async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError> {
        self.ensure_open()?;
        let id = OrderId::generate();
        let mut stored = order.clone();
        stored.id = id.clone();

        {
            let mut state = self.write();
            state.orders.push(stored.clone());
            if let Err(e) = self.flush(&state) {
                state.orders.pop();
                return Err(e);
            }
        }

        debug!(order_id = %id, "order stored");
        self.notifier.publish(ChangeEvent::OrderInserted(stored));
        Ok(id)
    }

    async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, StoreError> {
        self.ensure_open()?;
        let updated = {
            let mut state = self.write();
            let pos = state
                .orders
                .iter()
                .position(|o| &o.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

            let before = state.orders[pos].clone();
            state.orders[pos]
                .apply_patch(patch, Utc::now())
                .map_err(|e| StoreError::Rejected(e.to_string()))?;
            if let Err(e) = self.flush(&state) {
                state.orders[pos] = before;
                return Err(e);
            }
            state.orders[pos].clone()
        };

        self.notifier.publish(ChangeEvent::OrderUpdated(updated.clone()));
        Ok(updated)
    }

    async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.ensure_open()?;
        let mut orders: Vec<Order> = self
            .read()
            .orders
            .iter()
            .filter(|o| o.is_active())
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }
}
