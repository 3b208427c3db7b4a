//! Order placement.

use anyhow::{Context as _, Result};
use chrono::Utc;
use comanda_commerce::checkout::OrderComposer;
use comanda_observability::OrderMetrics;
use serde_json::json;

use super::{checkout_form, fill_cart, open_storefront, CartArgs, OrderArgs, OrderCommand};
use crate::context::{local_time, Context};
use crate::dispatch::ConsoleDispatch;

/// Run the order command.
pub async fn run(args: OrderArgs, ctx: &Context) -> Result<()> {
    match args.command {
        OrderCommand::Place(cart) => place(cart, ctx).await,
    }
}

async fn place(args: CartArgs, ctx: &Context) -> Result<()> {
    let now = local_time(args.at.as_deref())?;
    let connection = ctx.connect()?;
    let store = connection.data_store();
    let mut storefront = open_storefront(store.as_ref(), ctx).await?;

    fill_cart(&mut storefront, &args.items, now)?;
    let form = checkout_form(&args, ctx, &storefront)?;
    storefront.begin_checkout()?;

    let metrics = OrderMetrics::new();
    let dispatch = ConsoleDispatch::new(ctx.output.is_json());
    let composer = OrderComposer::new(store.as_ref(), &dispatch).with_observer(&metrics);

    let placed = storefront
        .place_order(&composer, &form, Utc::now())
        .await
        .context("Order was not placed")?;
    ctx.output.debug(&metrics.snapshot().to_summary());
    ctx.output.debug(&format!(
        "{} message(s) handed to the console",
        dispatch.sent().len()
    ));

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "order": placed.order,
            "number": placed.order.number(),
            "message": placed.message,
            "dispatch_warning": placed.dispatch_warning,
        }));
    } else {
        ctx.output.success(&format!(
            "Order #{} placed ({})",
            placed.order.number(),
            placed.order.total
        ));
        ctx.output.kv("id", placed.order_id.as_str());
        if let Some(ref warning) = placed.dispatch_warning {
            ctx.output
                .warn(&format!("Saved, but the kitchen message was not sent: {}", warning));
        }
    }

    connection.close().await?;
    Ok(())
}
