//! Commerce error types.

use thiserror::Error;

use crate::backend::StoreError;

/// Errors that can occur in ordering operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A catalog fetch from the data store failed.
    #[error("Catalog fetch failed: {0}")]
    CatalogFetch(String),

    /// Input rejected by a business rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The order could not be persisted.
    #[error("Could not save the order: {0}")]
    Persistence(String),

    /// The outbound message could not be handed to the messaging channel.
    #[error("Message dispatch failed: {0}")]
    Dispatch(String),

    /// Product not found in the current catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not available for ordering.
    #[error("Product not available: {0}")]
    ProductUnavailable(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Line item not in cart.
    #[error("Line item not in cart: {0}")]
    LineItemNotFound(String),

    /// Invalid order status transition.
    #[error("Invalid order status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CommerceError {
    /// Map a store error raised while reading catalog data.
    pub fn from_fetch(e: StoreError) -> Self {
        CommerceError::CatalogFetch(e.to_string())
    }

    /// Map a store error raised while writing an order.
    pub fn from_write(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => CommerceError::OrderNotFound(id),
            other => CommerceError::Persistence(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Serialization(e.to_string())
    }
}
