//! Collaborator contracts the ordering core depends on.
//!
//! The core never talks to a database, a messaging channel or a language
//! model directly. It is handed implementations of these traits, so the
//! storage layer owns its own field naming and retry policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{Category, CatalogSnapshot, PersonalizationGroup, Product, Promotion};
use crate::checkout::{AppSettings, Order, OrderPatch};
use crate::error::CommerceError;
use crate::ids::OrderId;

/// Errors raised by a data store implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or timed out.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the write.
    #[error("Store rejected the write: {0}")]
    Rejected(String),

    /// The addressed record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The connection was closed before the call.
    #[error("Store connection is closed")]
    Closed,

    /// Stored data could not be (de)serialized.
    #[error("Store serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Persistence and query collaborator.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All products, available or not.
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError>;

    /// All menu categories.
    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// All personalization groups with their options.
    async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError>;

    /// Promotions switched on by the admin, in creation order.
    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError>;

    /// Restaurant settings.
    async fn fetch_settings(&self) -> Result<AppSettings, StoreError>;

    /// Persist a new order; returns the id it was stored under.
    async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError>;

    /// Apply an admin patch to an order and return the updated record.
    async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, StoreError>;

    /// Orders that have not reached a terminal status.
    async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError>;
}

/// Change notification pushed by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// Products, options, promotions or settings changed.
    CatalogChanged,
    /// A customer placed a new order.
    OrderInserted(Order),
    /// An admin changed an existing order.
    OrderUpdated(Order),
}

/// Receiver of refresh results from a catalog subscription.
pub trait ChangeListener: Send + Sync {
    /// A fresh snapshot replaces whatever the listener held before.
    fn on_catalog_changed(&self, snapshot: CatalogSnapshot);

    /// A refresh failed; the previous snapshot stays in use.
    fn on_catalog_error(&self, _error: &CommerceError) {}

    /// A pushed order record.
    fn on_order_event(&self, _event: &ChangeEvent) {}
}

/// Errors raised by a messaging channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The channel could not be opened.
    #[error("Messaging channel unavailable: {0}")]
    Unavailable(String),

    /// The destination identifier is not usable.
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),
}

/// Fire-and-forget outbound message channel.
#[async_trait]
pub trait MessageDispatch: Send + Sync {
    /// Hand a pre-formatted text payload to the channel.
    async fn dispatch(&self, destination: &str, payload: &str) -> Result<(), DispatchError>;
}

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of an assistant conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Errors raised by a conversational assistant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssistantError {
    #[error("Assistant unavailable: {0}")]
    Unavailable(String),

    #[error("Assistant returned an empty reply")]
    EmptyReply,
}

/// Conversational assistant backed by a third-party model.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Reply to `message` given the prior conversation.
    async fn reply(&self, history: &[ChatMessage], message: &str) -> Result<String, AssistantError>;
}

/// Default reply used when the assistant cannot answer.
pub const ASSISTANT_FALLBACK_REPLY: &str =
    "Sorry, I can't answer right now. You can keep browsing the menu and place your order as usual.";

/// Assistant wrapper that never fails.
///
/// Any error or empty reply degrades to a static fallback text.
#[derive(Debug, Clone)]
pub struct AdvisoryAssistant<A> {
    inner: A,
    fallback: String,
}

impl<A: Assistant> AdvisoryAssistant<A> {
    /// Wrap an assistant with the default fallback reply.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            fallback: ASSISTANT_FALLBACK_REPLY.to_string(),
        }
    }

    /// Override the fallback reply.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Ask the assistant; returns the fallback on failure.
    pub async fn reply(&self, history: &[ChatMessage], message: &str) -> String {
        match self.inner.reply(history, message).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(error = %AssistantError::EmptyReply, "assistant fell back to static reply");
                self.fallback.clone()
            }
            Err(e) => {
                warn!(error = %e, "assistant fell back to static reply");
                self.fallback.clone()
            }
        }
    }
}
