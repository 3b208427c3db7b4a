//! Price a cart without placing it.

use anyhow::Result;
use comanda_commerce::checkout::{OrderComposer, OrderType};
use serde_json::json;

use super::{checkout_form, fill_cart, open_storefront, QuoteArgs};
use crate::context::{local_time, Context};

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let args = args.cart;
    let now = local_time(args.at.as_deref())?;
    let connection = ctx.connect()?;
    let mut storefront = open_storefront(connection.data_store().as_ref(), ctx).await?;

    fill_cart(&mut storefront, &args.items, now)?;
    let form = checkout_form(&args, ctx, &storefront)?;
    let settings = &storefront.snapshot().settings;
    let totals = OrderComposer::quote(storefront.cart(), &form, settings)?;
    let problem = form.validate(settings).err();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": storefront.cart().items,
            "totals": totals,
            "shipping_label": settings.shipping.message_label(settings.currency),
            "ready_to_place": problem.is_none(),
            "problem": problem.as_ref().map(|e| e.to_string()),
        }));
        connection.close().await?;
        return Ok(());
    }

    ctx.output.header("Quote");
    for line in &storefront.cart().items {
        let total = line.total()?;
        ctx.output.table_row(
            &[&format!("{}x", line.quantity), &line.name, &total.display()],
            &[4, 24, 0],
        );
        for option in &line.options {
            ctx.output.kv("  +", &option.name);
        }
    }

    ctx.output.kv("Subtotal", &totals.subtotal.display());
    if form.order_type() == OrderType::Delivery {
        ctx.output
            .kv("Shipping", &settings.shipping.message_label(settings.currency));
    }
    if totals.tip.is_positive() {
        ctx.output.kv("Tip", &totals.tip.display());
    }
    ctx.output.kv("Total", &totals.grand_total.display());

    match problem {
        Some(e) => ctx.output.warn(&format!("Not ready to place: {}", e)),
        None => ctx.output.success("Ready to place"),
    }

    connection.close().await?;
    Ok(())
}
