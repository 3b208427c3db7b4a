//! Plain-text order summary sent to the restaurant's messaging channel.
//!
//! Line oriented, with literal separator lines. One template per order type;
//! nothing parses the text back.

use std::fmt::Write;

use crate::checkout::{AppSettings, Fulfillment, Order, OrderItem};

const SEPARATOR: &str = "------------------------------";

/// Render the outbound summary of a persisted order.
pub fn format_order_message(order: &Order, settings: &AppSettings) -> String {
    let mut out = String::new();

    let title = match &order.fulfillment {
        Fulfillment::DineIn { .. } => "NEW DINE-IN ORDER",
        Fulfillment::TakeAway => "NEW TAKE-AWAY ORDER",
        Fulfillment::Delivery { .. } => "NEW DELIVERY ORDER",
    };
    line(&mut out, format_args!("*{}* #{}", title, order.number()));
    line(&mut out, format_args!("{}", settings.restaurant_name));
    line(&mut out, format_args!("{}", SEPARATOR));

    line(&mut out, format_args!("Customer: {}", order.customer.name.trim()));
    match &order.fulfillment {
        Fulfillment::DineIn { table } => {
            line(&mut out, format_args!("Table: {}", table));
        }
        Fulfillment::TakeAway => {
            write_phone(&mut out, order);
        }
        Fulfillment::Delivery { address } => {
            write_phone(&mut out, order);
            line(&mut out, format_args!("Address: {}", address.one_line()));
        }
    }
    line(&mut out, format_args!("{}", SEPARATOR));

    for item in &order.items {
        write_item(&mut out, item);
    }
    line(&mut out, format_args!("{}", SEPARATOR));

    line(&mut out, format_args!("Subtotal: {}", order.subtotal));
    if let Fulfillment::Delivery { .. } = order.fulfillment {
        line(
            &mut out,
            format_args!("Shipping: {}", settings.shipping.message_label(order.total.currency)),
        );
    }
    if let Some(tip) = order.tip.filter(|t| t.is_positive()) {
        line(&mut out, format_args!("Tip: {}", tip));
    }
    line(&mut out, format_args!("*Total: {}*", order.total));
    line(&mut out, format_args!("Payment: {}", order.payment_method));

    if let Some(comments) = order.comments.as_deref().filter(|c| !c.trim().is_empty()) {
        line(&mut out, format_args!("{}", SEPARATOR));
        line(&mut out, format_args!("Comments: {}", comments.trim()));
    }

    out
}

fn write_phone(out: &mut String, order: &Order) {
    if let Some(phone) = order.customer.phone.as_deref() {
        line(out, format_args!("Phone: {}", phone.trim()));
    }
}

fn write_item(out: &mut String, item: &OrderItem) {
    line(out, format_args!("{}x {}  {}", item.quantity, item.name, item.total));
    for option in &item.options {
        if option.price.is_zero() {
            line(out, format_args!("   + {}", option.name));
        } else {
            line(out, format_args!("   + {} ({})", option.name, option.price));
        }
    }
    if let Some(comment) = &item.comment {
        line(out, format_args!("   Note: {}", comment));
    }
}

fn line(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing into a String cannot fail.
    let _ = out.write_fmt(args);
    out.push('\n');
}
