//! Customer session: latest catalog, priced menu, cart and checkout flow.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::backend::{ChangeListener, DataStore};
use crate::cart::{Cart, OrderableSnapshot, PersonalizationSelector};
use crate::catalog::{CatalogSnapshot, Category, Product};
use crate::checkout::{CheckoutFlow, CheckoutForm, CheckoutStep, OrderComposer, PlacedOrder};
use crate::error::CommerceError;
use crate::ids::{CategoryId, LineItemId, ProductId};
use crate::pricing::{price_of, PricedProduct};

/// A product with its price at a given instant.
#[derive(Debug, Clone)]
pub struct MenuEntry<'a> {
    pub product: &'a Product,
    pub priced: PricedProduct<'a>,
}

/// One category of the menu. `category` is `None` for uncategorized products.
#[derive(Debug, Clone)]
pub struct MenuSection<'a> {
    pub category: Option<&'a Category>,
    pub entries: Vec<MenuEntry<'a>>,
}

/// One customer's ordering session.
///
/// Holds the most recent catalog snapshot. Refreshing swaps it whole; lines
/// already in the cart keep the prices they were added with.
#[derive(Debug)]
pub struct Storefront {
    snapshot: Arc<CatalogSnapshot>,
    cart: Cart,
    flow: CheckoutFlow,
}

impl Storefront {
    pub fn new(snapshot: impl Into<Arc<CatalogSnapshot>>) -> Self {
        let snapshot = snapshot.into();
        let cart = Cart::new(snapshot.settings.currency);
        Self {
            snapshot,
            cart,
            flow: CheckoutFlow::new(),
        }
    }

    /// Fetch a snapshot and open a session on it.
    pub async fn open(store: &dyn DataStore) -> Result<Self, CommerceError> {
        Ok(Self::new(CatalogSnapshot::fetch(store).await?))
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn flow(&self) -> &CheckoutFlow {
        &self.flow
    }

    /// Swap in a newer snapshot. Older or equal snapshots are ignored.
    pub fn replace_snapshot(&mut self, snapshot: Arc<CatalogSnapshot>) -> bool {
        if snapshot.fetched_at <= self.snapshot.fetched_at {
            return false;
        }
        if self.cart.is_empty() {
            self.cart = Cart::new(snapshot.settings.currency);
        }
        debug!(products = snapshot.products.len(), "catalog snapshot replaced");
        self.snapshot = snapshot;
        true
    }

    /// Pull the latest snapshot held by a cell.
    pub fn refresh_from(&mut self, cell: &CatalogCell) -> bool {
        match cell.latest() {
            Some(snapshot) => self.replace_snapshot(snapshot),
            None => false,
        }
    }

    /// Re-fetch the catalog. On failure the current snapshot stays in use.
    pub async fn refresh(&mut self, store: &dyn DataStore) -> Result<(), CommerceError> {
        let snapshot = CatalogSnapshot::fetch(store).await?;
        self.replace_snapshot(Arc::new(snapshot));
        Ok(())
    }

    /// Available products grouped by category, priced at `now`.
    ///
    /// Empty categories are left out; uncategorized products come last.
    pub fn menu(&self, now: NaiveDateTime) -> Vec<MenuSection<'_>> {
        let snapshot = &*self.snapshot;
        let mut sections: Vec<MenuSection<'_>> = snapshot
            .sorted_categories()
            .into_iter()
            .map(|category| MenuSection {
                category: Some(category),
                entries: menu_entries(snapshot, Some(&category.id), now),
            })
            .collect();
        sections.push(MenuSection {
            category: None,
            entries: menu_entries(snapshot, None, now),
        });
        sections.retain(|s| !s.entries.is_empty());
        sections
    }

    /// Look up an orderable product.
    pub fn product(&self, product_id: &ProductId) -> Result<&Product, CommerceError> {
        let product = self
            .snapshot
            .product(product_id)
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        if !product.is_available() {
            return Err(CommerceError::ProductUnavailable(product_id.to_string()));
        }
        Ok(product)
    }

    /// Price one product at `now`.
    pub fn price(&self, product_id: &ProductId, now: NaiveDateTime) -> Result<PricedProduct<'_>, CommerceError> {
        let product = self.product(product_id)?;
        Ok(price_of(product, &self.snapshot.promotions, now))
    }

    /// Start configuring a product.
    pub fn open_selector(&self, product_id: &ProductId) -> Result<PersonalizationSelector, CommerceError> {
        let product = self.product(product_id)?;
        let groups = self
            .snapshot
            .groups_for(product)
            .into_iter()
            .cloned()
            .collect();
        Ok(PersonalizationSelector::new(groups, self.snapshot.settings.currency))
    }

    /// Price and add a configured product to the cart.
    ///
    /// Fails if the product is gone or unavailable, or if a group has fewer
    /// picks than its minimum.
    pub fn add_to_cart(
        &mut self,
        product_id: &ProductId,
        selector: &PersonalizationSelector,
        quantity: i64,
        comment: Option<String>,
        now: NaiveDateTime,
    ) -> Result<LineItemId, CommerceError> {
        selector.validate()?;
        let product = self.product(product_id)?;
        let priced = price_of(product, &self.snapshot.promotions, now);
        let orderable = OrderableSnapshot::capture(product, &priced, selector.selected_options());

        let line_id = self.cart.add(orderable, quantity, comment)?;
        debug!(product = %product_id, line = %line_id, "added to cart");
        Ok(line_id)
    }

    /// Move from the cart to the details step.
    pub fn begin_checkout(&mut self) -> Result<(), CommerceError> {
        self.flow.advance(&self.cart)?;
        Ok(())
    }

    /// Go back from details to the cart.
    pub fn back_to_cart(&mut self) -> Result<(), CommerceError> {
        self.flow.go_back()?;
        Ok(())
    }

    /// Place the cart as an order and enter confirmation.
    ///
    /// When placement fails the flow stays on the details step and the cart is
    /// kept so the customer can retry. A session still showing the previous
    /// confirmation starts a new checkout first.
    pub async fn place_order(
        &mut self,
        composer: &OrderComposer<'_>,
        form: &CheckoutForm,
        now: DateTime<Utc>,
    ) -> Result<PlacedOrder, CommerceError> {
        if self.flow.is_confirmed() {
            self.flow.reset();
        }
        if self.flow.step == CheckoutStep::Cart {
            self.flow.advance(&self.cart)?;
        }
        // Confirm below must not fail once the order is saved.
        debug_assert_eq!(self.flow.step, CheckoutStep::Details);
        let settings = self.snapshot.settings.clone();
        let placed = composer
            .place_order(&mut self.cart, form, &settings, now)
            .await?;
        self.flow.confirm(placed.order_id.clone())?;
        info!(order_id = %placed.order_id, "checkout confirmed");
        Ok(placed)
    }

    /// Leave confirmation and start a new order.
    pub fn start_new_order(&mut self) {
        self.flow.reset();
    }
}

fn menu_entries<'a>(
    snapshot: &'a CatalogSnapshot,
    category_id: Option<&CategoryId>,
    now: NaiveDateTime,
) -> Vec<MenuEntry<'a>> {
    snapshot
        .available_in(category_id)
        .into_iter()
        .map(|product| MenuEntry {
            product,
            priced: price_of(product, &snapshot.promotions, now),
        })
        .collect()
}

/// Holds the latest catalog snapshot delivered by a subscription.
#[derive(Debug, Default)]
pub struct CatalogCell {
    latest: RwLock<Option<Arc<CatalogSnapshot>>>,
    last_error: RwLock<Option<String>>,
}

impl CatalogCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Arc<CatalogSnapshot>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Message of the most recent failed refresh, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ChangeListener for CatalogCell {
    fn on_catalog_changed(&self, snapshot: CatalogSnapshot) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(snapshot));
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn on_catalog_error(&self, error: &CommerceError) {
        warn!(error = %error, "catalog refresh failed, keeping previous snapshot");
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error.to_string());
    }
}
