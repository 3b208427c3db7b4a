//! Restaurant ordering domain.
//!
//! - **Catalog**: products, categories, personalization groups, promotions
//! - **Pricing**: promotion resolution and line/cart/order totals
//! - **Cart**: personalization selection, orderable snapshots, the cart itself
//! - **Checkout**: settings, customer form, orders, outbound message, composer
//! - **Admin**: active order board and status/payment operations
//! - **Backend**: collaborator traits (data store, messaging, assistant)
//!
//! # Example
//!
//! ```rust,ignore
//! use comanda_commerce::prelude::*;
//!
//! let mut storefront = Storefront::open(&store).await?;
//! let burger = ProductId::new("burger");
//!
//! let mut selector = storefront.open_selector(&burger)?;
//! selector.toggle(&PersonalizationId::new("size"), &OptionId::new("large"));
//! storefront.add_to_cart(&burger, &selector, 2, Some("no onions".into()), now)?;
//!
//! let composer = OrderComposer::new(&store, &dispatch);
//! let placed = storefront.place_order(&composer, &form, Utc::now()).await?;
//! println!("Order #{} total {}", placed.order.number(), placed.order.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod admin;
pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod pricing;
pub mod storefront;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Collaborators
    pub use crate::backend::{
        AdvisoryAssistant, Assistant, ChangeEvent, ChangeListener, DataStore, DispatchError,
        MessageDispatch, StoreError,
    };

    // Catalog
    pub use crate::catalog::{
        CatalogSnapshot, Category, PersonalizationGroup, PersonalizationOption, Product,
        Promotion, PromotionDiscount, PromotionScope,
    };

    // Pricing
    pub use crate::pricing::{OrderTotals, PricedProduct};

    // Cart
    pub use crate::cart::{
        Cart, CartLineItem, OrderableSnapshot, PersonalizationSelector, SelectedOption,
        ToggleOutcome,
    };

    // Checkout
    pub use crate::checkout::{
        AppSettings, CheckoutForm, CheckoutObserver, CheckoutStep, CustomerInfo,
        DeliveryAddress, Fulfillment, Order, OrderComposer, OrderPatch, OrderStatus, OrderType,
        PaymentStatus, PlacedOrder, ShippingCostType, ShippingPolicy,
    };

    // Sessions
    pub use crate::admin::{OrderAdmin, OrderBoard};
    pub use crate::storefront::{CatalogCell, Storefront};
}
