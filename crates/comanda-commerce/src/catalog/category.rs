//! Menu categories.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A menu section ("Drinks", "Desserts").
///
/// Categories group products for display only; they play no part in pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// Sort order position on the menu.
    #[serde(default)]
    pub position: i32,
}

impl Category {
    /// Create a new category.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: 0,
        }
    }

    /// Set the sort position.
    pub fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }
}
