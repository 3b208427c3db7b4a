//! Cart module.
//!
//! Contains the personalization selector, the catalog-independent orderable
//! snapshot, and the cart aggregate built from those snapshots.

mod cart;
mod selection;
mod snapshot;

pub use cart::{Cart, CartLineItem, MAX_QUANTITY_PER_ITEM};
pub use selection::{PersonalizationSelector, RejectReason, SelectedOption, ToggleOutcome};
pub use snapshot::OrderableSnapshot;
