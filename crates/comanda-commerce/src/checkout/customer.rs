//! Customer contact, fulfillment details and the checkout form.

use serde::{Deserialize, Serialize};

use crate::checkout::{AppSettings, OrderType};
use crate::error::CommerceError;
use crate::ids::TableId;
use crate::money::Money;

/// Customer contact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerInfo {
    /// Name the order is called out under.
    pub name: String,
    /// Contact phone; required for take-away and delivery.
    pub phone: Option<String>,
}

impl CustomerInfo {
    /// Create a customer with a name and no phone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
        }
    }

    /// Set the contact phone.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

/// A delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliveryAddress {
    /// Street and number.
    pub street: String,
    /// Neighbourhood or district.
    pub district: Option<String>,
    /// Landmark or directions for the courier.
    pub reference: Option<String>,
}

impl DeliveryAddress {
    /// Create an address with only the street line.
    pub fn new(street: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            district: None,
            reference: None,
        }
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.street.trim().to_string()];
        if let Some(ref district) = self.district {
            parts.push(district.trim().to_string());
        }
        if let Some(ref reference) = self.reference {
            parts.push(format!("ref: {}", reference.trim()));
        }
        parts.retain(|p| !p.is_empty());
        parts.join(", ")
    }

    /// An address needs at least a street.
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty()
    }
}

/// Where the order goes, by order type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Fulfillment {
    /// Served at `table`.
    DineIn { table: TableId },
    /// Picked up at the counter.
    TakeAway,
    /// Sent to `address`.
    Delivery { address: DeliveryAddress },
}

impl Fulfillment {
    pub fn order_type(&self) -> OrderType {
        match self {
            Fulfillment::DineIn { .. } => OrderType::DineIn,
            Fulfillment::TakeAway => OrderType::TakeAway,
            Fulfillment::Delivery { .. } => OrderType::Delivery,
        }
    }

    pub fn table(&self) -> Option<&TableId> {
        match self {
            Fulfillment::DineIn { table } => Some(table),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<&DeliveryAddress> {
        match self {
            Fulfillment::Delivery { address } => Some(address),
            _ => None,
        }
    }
}

/// Everything the customer fills in at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutForm {
    /// Contact details.
    pub customer: CustomerInfo,
    /// Table, pickup or delivery address.
    pub fulfillment: Fulfillment,
    /// Must be one of the methods enabled for the order type.
    pub payment_method: String,
    /// Payment proof reference, if the customer supplied one.
    pub payment_proof: Option<String>,
    /// Tip; zero when none.
    pub tip: Money,
    /// General note for the whole order.
    pub note: Option<String>,
}

impl CheckoutForm {
    /// Create a form with no tip, note or payment proof.
    pub fn new(customer: CustomerInfo, fulfillment: Fulfillment, payment_method: impl Into<String>) -> Self {
        Self {
            customer,
            fulfillment,
            payment_method: payment_method.into(),
            payment_proof: None,
            tip: Money::default(),
            note: None,
        }
    }

    pub fn with_tip(mut self, tip: Money) -> Self {
        self.tip = tip;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn order_type(&self) -> OrderType {
        self.fulfillment.order_type()
    }

    /// Check the form against the restaurant settings.
    pub fn validate(&self, settings: &AppSettings) -> Result<(), CommerceError> {
        let order_type = self.order_type();

        if !settings.accepts_order_type(order_type) {
            return Err(CommerceError::Validation(format!(
                "{} orders are not accepted",
                order_type.display_name()
            )));
        }

        if self.customer.name.trim().is_empty() {
            return Err(CommerceError::Validation("customer name is required".into()));
        }

        match &self.fulfillment {
            Fulfillment::DineIn { table } => {
                if table.as_str().trim().is_empty() {
                    return Err(CommerceError::Validation("table is required".into()));
                }
            }
            Fulfillment::TakeAway => {
                if !self.customer.has_phone() {
                    return Err(CommerceError::Validation("phone is required".into()));
                }
            }
            Fulfillment::Delivery { address } => {
                if !address.is_complete() {
                    return Err(CommerceError::Validation(
                        "delivery address is required".into(),
                    ));
                }
                if !self.customer.has_phone() {
                    return Err(CommerceError::Validation("phone is required".into()));
                }
            }
        }

        if self.payment_method.trim().is_empty() {
            return Err(CommerceError::Validation("payment method is required".into()));
        }
        if !settings.payment_methods.accepts(order_type, &self.payment_method) {
            return Err(CommerceError::Validation(format!(
                "payment method {} is not accepted for {} orders",
                self.payment_method,
                order_type.display_name()
            )));
        }

        if self.tip.is_negative() {
            return Err(CommerceError::Validation("tip cannot be negative".into()));
        }
        if !self.tip.is_zero() && self.tip.currency != settings.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: settings.currency.code().to_string(),
                got: self.tip.currency.code().to_string(),
            });
        }

        Ok(())
    }
}
