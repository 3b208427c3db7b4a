//! Active order management.

use anyhow::{anyhow, bail, Result};
use comanda_commerce::admin::{OrderAdmin, OrderBoard};
use comanda_commerce::checkout::{Order, OrderStatus, PaymentStatus};

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::{payment_badge, status_badge};

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let connection = ctx.connect()?;
    let store = connection.data_store();
    let board = OrderBoard::load(store.as_ref()).await?;
    let admin = OrderAdmin::new(store.as_ref());

    let updated = match args.command {
        OrdersCommand::List { status } => {
            list(&board, status.as_deref(), ctx)?;
            None
        }
        OrdersCommand::Advance { order } => {
            Some(admin.advance(find(&board, &order)?).await?)
        }
        OrdersCommand::Cancel { order } => Some(admin.cancel(find(&board, &order)?).await?),
        OrdersCommand::Pay { order, proof } => {
            Some(admin.mark_paid(find(&board, &order)?, proof).await?)
        }
    };

    if let Some(order) = updated {
        if ctx.output.is_json() {
            ctx.output.json(&order);
        } else {
            ctx.output.success(&format!(
                "Order #{} is {} ({})",
                order.number(),
                status_badge(order.status),
                payment_badge(order.payment_status)
            ));
        }
    }

    connection.close().await?;
    Ok(())
}

fn list(board: &OrderBoard, status: Option<&str>, ctx: &Context) -> Result<()> {
    let orders: Vec<&Order> = match status {
        Some(s) => {
            let status: OrderStatus = s.parse()?;
            board.with_status(status).collect()
        }
        None => board.orders().iter().collect(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Active orders");
    if orders.is_empty() {
        ctx.output.info("No active orders");
        return Ok(());
    }

    ctx.output.table_row(
        &["Number", "Type", "Status", "Payment", "Customer", "Total"],
        &[8, 10, 10, 8, 16, 0],
    );
    for order in orders {
        let status = padded(status_badge(order.status), order.status.as_str().len(), 10);
        let payment = padded(payment_badge(order.payment_status), payment_len(order), 8);
        ctx.output.table_row(
            &[
                &order.number(),
                order.order_type().as_str(),
                &status,
                &payment,
                &order.customer.name,
                &order.total.display(),
            ],
            &[8, 10, 0, 0, 16, 0],
        );
    }
    Ok(())
}

/// Pad a styled label by its visible length; escape codes would skew `{:width$}`.
fn padded(styled: String, visible: usize, width: usize) -> String {
    format!("{}{}", styled, " ".repeat(width.saturating_sub(visible)))
}

fn payment_len(order: &Order) -> usize {
    match order.payment_status {
        PaymentStatus::Paid => "paid".len(),
        PaymentStatus::Pending => "unpaid".len(),
    }
}

/// Find an active order by full id or by its order number.
fn find<'a>(board: &'a OrderBoard, reference: &str) -> Result<&'a Order> {
    let reference = reference.trim().trim_start_matches('#');
    if let Some(order) = board.orders().iter().find(|o| o.id.as_str() == reference) {
        return Ok(order);
    }

    let wanted = reference.to_uppercase();
    let mut matches = board.orders().iter().filter(|o| o.number() == wanted);
    match (matches.next(), matches.next()) {
        (Some(order), None) => Ok(order),
        (Some(_), Some(_)) => bail!("Order number #{} is ambiguous, use the full id", wanted),
        (None, _) => Err(anyhow!("No active order '{}'", reference)),
    }
}
