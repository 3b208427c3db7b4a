//! Checkout flow state machine.

use crate::cart::Cart;
use crate::ids::OrderId;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Steps in the customer checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    /// Cart review.
    #[default]
    Cart,
    /// Contact, fulfillment and payment details.
    Details,
    /// Order placed.
    Confirmation,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Cart => "cart",
            CheckoutStep::Details => "details",
            CheckoutStep::Confirmation => "confirmation",
        }
    }

    /// Get the step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Cart => 1,
            CheckoutStep::Details => 2,
            CheckoutStep::Confirmation => 3,
        }
    }
}

/// Where a customer session is in checkout.
///
/// The confirmation step is only entered through [`CheckoutFlow::confirm`],
/// once an order has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CheckoutFlow {
    pub step: CheckoutStep,
    /// Order placed by this flow, set on confirmation.
    pub placed_order: Option<OrderId>,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move from the cart to the details step.
    pub fn advance(&mut self, cart: &Cart) -> Result<CheckoutStep, CommerceError> {
        match self.step {
            CheckoutStep::Cart if cart.is_empty() => {
                Err(CommerceError::Validation("cart is empty".into()))
            }
            CheckoutStep::Cart => {
                self.step = CheckoutStep::Details;
                Ok(self.step)
            }
            from => Err(invalid(from, "next")),
        }
    }

    /// Go back from details to the cart.
    pub fn go_back(&mut self) -> Result<CheckoutStep, CommerceError> {
        match self.step {
            CheckoutStep::Details => {
                self.step = CheckoutStep::Cart;
                Ok(self.step)
            }
            from => Err(invalid(from, "previous")),
        }
    }

    /// Record a persisted order and enter confirmation.
    pub fn confirm(&mut self, order_id: OrderId) -> Result<(), CommerceError> {
        if self.step != CheckoutStep::Details {
            return Err(invalid(self.step, CheckoutStep::Confirmation.as_str()));
        }
        self.step = CheckoutStep::Confirmation;
        self.placed_order = Some(order_id);
        Ok(())
    }

    /// Start over for a new order.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_confirmed(&self) -> bool {
        self.step == CheckoutStep::Confirmation
    }
}

fn invalid(from: CheckoutStep, to: &str) -> CommerceError {
    CommerceError::Validation(format!(
        "cannot move checkout from {} to {}",
        from.as_str(),
        to
    ))
}
