//! Personalization groups ("Milk type", "Extra toppings") and their options.

use crate::ids::{OptionId, PersonalizationId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// How many options of a group may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Radio group: picking an option replaces the previous pick.
    Exclusive,
    /// Checkbox group, optionally capped.
    Multiple { max: Option<u32> },
}

/// A single choice inside a personalization group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonalizationOption {
    /// Unique option identifier.
    pub id: OptionId,
    /// Option name.
    pub name: String,
    /// Price added to the unit price when selected. Never negative.
    pub price: Money,
    /// Whether the option can currently be selected.
    #[serde(default = "default_true")]
    pub available: bool,
}

impl PersonalizationOption {
    /// Create a new available option.
    pub fn new(id: impl Into<OptionId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.floor_zero(),
            available: true,
        }
    }

    /// Mark the option as unavailable.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// A named set of related options with cardinality bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonalizationGroup {
    /// Unique group identifier.
    pub id: PersonalizationId,
    /// Label shown to the customer.
    pub name: String,
    /// Options in display order.
    #[serde(default)]
    pub options: Vec<PersonalizationOption>,
    /// Minimum selections required before adding to cart.
    #[serde(default)]
    pub min_selection: u32,
    /// Maximum selections allowed; `None` is unlimited.
    #[serde(default)]
    pub max_selection: Option<u32>,
    /// Declared by the catalog; selections are still a set per group.
    #[serde(default)]
    pub allow_repetition: bool,
}

impl PersonalizationGroup {
    /// Create a group with no options and no bounds.
    pub fn new(id: impl Into<PersonalizationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            options: Vec::new(),
            min_selection: 0,
            max_selection: None,
            allow_repetition: false,
        }
    }

    /// Set the cardinality bounds.
    pub fn with_bounds(mut self, min: u32, max: Option<u32>) -> Self {
        self.min_selection = min;
        self.max_selection = max;
        self
    }

    /// Append an option.
    pub fn with_option(mut self, option: PersonalizationOption) -> Self {
        self.options.push(option);
        self
    }

    /// Selection mode derived from `max_selection`.
    pub fn mode(&self) -> SelectionMode {
        match self.max_selection {
            Some(1) => SelectionMode::Exclusive,
            max => SelectionMode::Multiple { max },
        }
    }

    /// Options the customer may pick right now.
    pub fn selectable_options(&self) -> impl Iterator<Item = &PersonalizationOption> {
        self.options.iter().filter(|o| o.available)
    }

    /// Find an option by id, whether available or not.
    pub fn option(&self, option_id: &OptionId) -> Option<&PersonalizationOption> {
        self.options.iter().find(|o| &o.id == option_id)
    }

    /// Whether at least one selection is required.
    pub fn is_required(&self) -> bool {
        self.min_selection > 0
    }
}
