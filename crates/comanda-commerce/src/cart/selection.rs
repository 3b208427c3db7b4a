//! Personalization selection state for one product being configured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{PersonalizationGroup, PersonalizationOption, SelectionMode};
use crate::error::CommerceError;
use crate::ids::{OptionId, PersonalizationId};
use crate::money::{Currency, Money};
use crate::pricing;

/// An option as it was when the customer picked it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedOption {
    /// Group the option was picked from.
    pub group_id: PersonalizationId,
    /// Option id.
    pub option_id: OptionId,
    /// Option name at selection time.
    pub name: String,
    /// Price delta at selection time.
    pub price: Money,
}

impl SelectedOption {
    fn capture(group: &PersonalizationGroup, option: &PersonalizationOption) -> Self {
        Self {
            group_id: group.id.clone(),
            option_id: option.id.clone(),
            name: option.name.clone(),
            price: option.price,
        }
    }
}

/// Why a toggle left the selection unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The group does not belong to the product.
    UnknownGroup,
    /// The option is not in the group.
    UnknownOption,
    /// The option is switched off in the catalog.
    Unavailable,
    /// A multi-select group already holds its maximum.
    LimitReached,
}

/// Effect of a toggle on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The option was added to the group's selection.
    Selected,
    /// Radio group: the option replaced the previous pick.
    Replaced,
    /// Multi-select group: the option was removed.
    Deselected,
    /// Nothing changed.
    Rejected(RejectReason),
}

/// Tracks which options are picked in each personalization group of a product.
///
/// Radio groups (`max_selection == 1`) hold zero or one option; multi-select
/// groups never exceed their `max_selection`.
#[derive(Debug, Clone)]
pub struct PersonalizationSelector {
    groups: Vec<PersonalizationGroup>,
    selections: HashMap<PersonalizationId, Vec<SelectedOption>>,
    currency: Currency,
}

impl PersonalizationSelector {
    /// Start an empty selection over `groups`.
    pub fn new(groups: Vec<PersonalizationGroup>, currency: Currency) -> Self {
        Self {
            groups,
            selections: HashMap::new(),
            currency,
        }
    }

    /// Groups in display order.
    pub fn groups(&self) -> &[PersonalizationGroup] {
        &self.groups
    }

    /// Toggle `option_id` within `group_id`.
    pub fn toggle(&mut self, group_id: &PersonalizationId, option_id: &OptionId) -> ToggleOutcome {
        let Some(group) = self.groups.iter().find(|g| &g.id == group_id) else {
            return ToggleOutcome::Rejected(RejectReason::UnknownGroup);
        };
        let Some(option) = group.option(option_id) else {
            return ToggleOutcome::Rejected(RejectReason::UnknownOption);
        };
        if !option.available {
            return ToggleOutcome::Rejected(RejectReason::Unavailable);
        }

        let captured = SelectedOption::capture(group, option);
        let mode = group.mode();
        let current = self.selections.entry(group_id.clone()).or_default();

        let outcome = match mode {
            SelectionMode::Exclusive => {
                let had_other = current.iter().any(|s| &s.option_id != option_id);
                current.clear();
                current.push(captured);
                if had_other {
                    ToggleOutcome::Replaced
                } else {
                    ToggleOutcome::Selected
                }
            }
            SelectionMode::Multiple { max } => {
                if let Some(pos) = current.iter().position(|s| &s.option_id == option_id) {
                    current.remove(pos);
                    ToggleOutcome::Deselected
                } else if max.is_some_and(|max| current.len() >= max as usize) {
                    ToggleOutcome::Rejected(RejectReason::LimitReached)
                } else {
                    current.push(captured);
                    ToggleOutcome::Selected
                }
            }
        };

        debug!(group = %group_id, option = %option_id, ?outcome, "personalization toggled");
        outcome
    }

    /// Options currently picked in a group, in selection order.
    pub fn selected_in(&self, group_id: &PersonalizationId) -> &[SelectedOption] {
        self.selections
            .get(group_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if an option is currently picked.
    pub fn is_selected(&self, group_id: &PersonalizationId, option_id: &OptionId) -> bool {
        self.selected_in(group_id)
            .iter()
            .any(|s| &s.option_id == option_id)
    }

    /// All picks flattened, groups in display order.
    pub fn selected_options(&self) -> Vec<SelectedOption> {
        self.groups
            .iter()
            .flat_map(|g| self.selected_in(&g.id).iter().cloned())
            .collect()
    }

    /// Sum of the price deltas of every pick.
    pub fn extra_price(&self) -> Result<Money, CommerceError> {
        pricing::unit_price_with_options(Money::zero(self.currency), &self.selected_options())
    }

    /// Fail on the first group with fewer picks than its `min_selection`.
    pub fn validate(&self) -> Result<(), CommerceError> {
        for group in self.groups.iter().filter(|g| g.is_required()) {
            let count = self.selected_in(&group.id).len();
            if count < group.min_selection as usize {
                return Err(CommerceError::Validation(format!(
                    "group {} requires at least {} selection(s)",
                    group.id, group.min_selection
                )));
            }
        }
        Ok(())
    }

    /// Replace group definitions with a fresher copy.
    ///
    /// Picks whose option disappeared or became unavailable are dropped; the
    /// remaining picks keep the price captured when they were made.
    pub fn sync_with(&mut self, groups: Vec<PersonalizationGroup>) {
        self.selections.retain(|group_id, picks| {
            let Some(group) = groups.iter().find(|g| &g.id == group_id) else {
                return false;
            };
            picks.retain(|pick| group.option(&pick.option_id).is_some_and(|o| o.available));
            !picks.is_empty()
        });
        self.groups = groups;
    }

    /// Drop every pick.
    pub fn reset(&mut self) {
        self.selections.clear();
    }
}
