//! Menu catalog module.
//!
//! Contains products, categories, personalization groups, promotions and the
//! snapshot type that bundles them for one pricing session.

mod category;
mod personalization;
mod product;
mod promotion;
mod snapshot;

pub use category::Category;
pub use personalization::{PersonalizationGroup, PersonalizationOption, SelectionMode};
pub use product::Product;
pub use promotion::{Promotion, PromotionDiscount, PromotionScope};
pub use snapshot::CatalogSnapshot;
