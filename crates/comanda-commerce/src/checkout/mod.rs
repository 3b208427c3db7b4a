//! Checkout module.
//!
//! Contains restaurant settings, customer details, the order record and its
//! status lifecycle, the outbound message templates, and the composer that
//! turns a cart into a persisted order.

mod composer;
mod customer;
mod flow;
mod message;
mod order;
mod settings;

pub use composer::{CheckoutObserver, OrderComposer, PlacedOrder};
pub use customer::{CheckoutForm, CustomerInfo, DeliveryAddress, Fulfillment};
pub use flow::{CheckoutFlow, CheckoutStep};
pub use message::format_order_message;
pub use order::{Order, OrderItem, OrderPatch, OrderStatus, OrderType, PaymentStatus};
pub use settings::{
    AppSettings, OpeningHours, PaymentMethods, PrintingMethod, ShippingCostType, ShippingPolicy,
};
