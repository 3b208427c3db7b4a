//! CLI command implementations.

pub mod config;
pub mod menu;
pub mod order;
pub mod orders;
pub mod quote;

use std::str::FromStr;

use anyhow::{anyhow, bail, Context as _, Result};
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};
use comanda_commerce::backend::DataStore;
use comanda_commerce::catalog::CatalogSnapshot;
use comanda_commerce::checkout::{
    CheckoutForm, CustomerInfo, DeliveryAddress, Fulfillment, OrderType,
};
use comanda_commerce::cart::ToggleOutcome;
use comanda_commerce::storefront::Storefront;
use comanda_commerce::{Money, OptionId, PersonalizationId, ProductId, TableId};

use crate::context::Context;

/// Arguments for the menu command.
#[derive(Args)]
pub struct MenuArgs {
    /// Price the menu at this local time (YYYY-MM-DD HH:MM).
    #[arg(long)]
    pub at: Option<String>,

    /// Also list the personalization groups of each product.
    #[arg(short, long)]
    pub options: bool,
}

/// One product to put in the cart.
///
/// Written as `PRODUCT[:QTY][@GROUP=OPTION[,OPTION...]]...`, for example
/// `latte:2@milk=oat` or `bagel@spread=butter,jam`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub product_id: ProductId,
    pub quantity: i64,
    pub options: Vec<(PersonalizationId, OptionId)>,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('@');
        let head = parts.next().unwrap_or_default().trim();

        let (product, quantity) = match head.split_once(':') {
            Some((product, qty)) => {
                let qty = qty
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("invalid quantity '{}' in '{}'", qty, s))?;
                (product.trim(), qty)
            }
            None => (head, 1),
        };
        if product.is_empty() {
            return Err(format!("missing product id in '{}'", s));
        }

        let mut options = Vec::new();
        for group_spec in parts {
            let (group, picks) = group_spec
                .split_once('=')
                .ok_or_else(|| format!("expected GROUP=OPTION, got '{}'", group_spec))?;
            for pick in picks.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                options.push((PersonalizationId::new(group.trim()), OptionId::new(pick)));
            }
        }

        Ok(Self {
            product_id: ProductId::new(product),
            quantity,
            options,
        })
    }
}

/// Cart and customer details shared by `quote` and `order place`.
#[derive(Args, Clone)]
pub struct CartArgs {
    /// Item to order (PRODUCT[:QTY][@GROUP=OPTION,...]); repeatable.
    #[arg(short, long = "item", required = true)]
    pub items: Vec<ItemSpec>,

    /// Order type: dine-in, take-away or delivery.
    #[arg(short = 't', long = "type", default_value = "take-away")]
    pub order_type: String,

    /// Customer name.
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Customer phone.
    #[arg(long)]
    pub phone: Option<String>,

    /// Table reference for dine-in.
    #[arg(long)]
    pub table: Option<String>,

    /// Street and number for delivery.
    #[arg(long)]
    pub street: Option<String>,

    /// District for delivery.
    #[arg(long)]
    pub district: Option<String>,

    /// Directions for the courier.
    #[arg(long)]
    pub reference: Option<String>,

    /// Payment method.
    #[arg(short, long)]
    pub payment: Option<String>,

    /// Tip in major units (e.g. 1.50).
    #[arg(long)]
    pub tip: Option<f64>,

    /// Note for the kitchen.
    #[arg(long)]
    pub note: Option<String>,

    /// Price at this local time (YYYY-MM-DD HH:MM).
    #[arg(long)]
    pub at: Option<String>,
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub cart: CartArgs,
}

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place an order and send it to the kitchen.
    Place(CartArgs),
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List active orders.
    List {
        /// Only orders in this status.
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Move an order to its next status.
    Advance {
        /// Order id or order number.
        order: String,
    },
    /// Cancel an order.
    Cancel {
        /// Order id or order number.
        order: String,
    },
    /// Mark an order as paid.
    Pay {
        /// Order id or order number.
        order: String,
        /// Payment reference.
        #[arg(long)]
        proof: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Write comanda.toml and a sample store.
    Init {
        /// Store file to create.
        #[arg(long, default_value = "store.json")]
        store: String,
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

/// Fetch the catalog, applying config overrides to the settings.
pub async fn open_storefront(store: &dyn DataStore, ctx: &Context) -> Result<Storefront> {
    let mut snapshot = CatalogSnapshot::fetch(store)
        .await
        .context("Failed to load the catalog")?;
    if let Some(ref destination) = ctx.config.defaults.destination {
        snapshot.settings.messaging_destination = destination.clone();
    }
    Ok(Storefront::new(snapshot))
}

/// Put every item into the storefront's cart.
pub fn fill_cart(storefront: &mut Storefront, items: &[ItemSpec], now: NaiveDateTime) -> Result<()> {
    for item in items {
        let mut selector = storefront
            .open_selector(&item.product_id)
            .with_context(|| format!("Cannot add '{}'", item.product_id))?;
        for (group, option) in &item.options {
            if let ToggleOutcome::Rejected(reason) = selector.toggle(group, option) {
                bail!(
                    "Cannot pick '{}' in '{}' for '{}': {:?}",
                    option,
                    group,
                    item.product_id,
                    reason
                );
            }
        }
        storefront
            .add_to_cart(&item.product_id, &selector, item.quantity, None, now)
            .with_context(|| format!("Cannot add '{}'", item.product_id))?;
    }
    Ok(())
}

/// Build the checkout form from flags and config defaults.
pub fn checkout_form(args: &CartArgs, ctx: &Context, storefront: &Storefront) -> Result<CheckoutForm> {
    let order_type: OrderType = args.order_type.parse().map_err(|e| anyhow!("{}", e))?;

    let mut customer = CustomerInfo::new(args.name.trim());
    if let Some(ref phone) = args.phone {
        customer = customer.with_phone(phone.trim());
    }

    let fulfillment = match order_type {
        OrderType::DineIn => {
            let table = args
                .table
                .clone()
                .or_else(|| ctx.config.defaults.table.clone())
                .unwrap_or_default();
            Fulfillment::DineIn {
                table: TableId::new(table),
            }
        }
        OrderType::TakeAway => Fulfillment::TakeAway,
        OrderType::Delivery => Fulfillment::Delivery {
            address: DeliveryAddress {
                street: args.street.clone().unwrap_or_default(),
                district: args.district.clone(),
                reference: args.reference.clone(),
            },
        },
    };

    let payment = args
        .payment
        .clone()
        .or_else(|| ctx.config.defaults.payment_method.clone())
        .unwrap_or_default();

    let mut form = CheckoutForm::new(customer, fulfillment, payment);
    if let Some(tip) = args.tip {
        form = form.with_tip(Money::from_decimal(tip, storefront.snapshot().settings.currency));
    }
    if let Some(ref note) = args.note {
        form = form.with_note(note.clone());
    }
    Ok(form)
}
