//! Menu listing.

use anyhow::Result;
use serde::Serialize;

use super::{open_storefront, MenuArgs};
use crate::context::{local_time, Context};

#[derive(Serialize)]
struct MenuItemJson<'a> {
    id: &'a str,
    name: &'a str,
    category: Option<&'a str>,
    price: String,
    listed_price: String,
    savings: Option<String>,
    promotion: Option<&'a str>,
    personalizations: Vec<&'a str>,
}

/// Run the menu command.
pub async fn run(args: MenuArgs, ctx: &Context) -> Result<()> {
    let now = local_time(args.at.as_deref())?;
    let connection = ctx.connect()?;
    let storefront = open_storefront(connection.data_store().as_ref(), ctx).await?;
    let sections = storefront.menu(now);
    let settings = &storefront.snapshot().settings;

    if ctx.output.is_json() {
        let items: Vec<MenuItemJson<'_>> = sections
            .iter()
            .flat_map(|section| {
                let category = section.category.map(|c| c.name.as_str());
                section.entries.iter().map(move |entry| MenuItemJson {
                    id: entry.product.id.as_str(),
                    name: &entry.product.name,
                    category,
                    price: entry.priced.price.display(),
                    listed_price: entry.priced.listed_price.display(),
                    savings: entry
                        .priced
                        .is_discounted()
                        .then(|| entry.priced.savings().display()),
                    promotion: entry.priced.promotion.map(|p| p.name.as_str()),
                    personalizations: entry
                        .product
                        .personalization_ids
                        .iter()
                        .map(|id| id.as_str())
                        .collect(),
                })
            })
            .collect();
        ctx.output.json(&items);
        connection.close().await?;
        return Ok(());
    }

    ctx.output.header(&settings.restaurant_name);
    if !settings.is_open_at(now) {
        ctx.output.warn("The restaurant is closed at this time");
    }
    if sections.is_empty() {
        ctx.output.info("Nothing on the menu");
    }

    for section in &sections {
        let title = section.category.map(|c| c.name.as_str()).unwrap_or("Other");
        ctx.output.header(title);
        for entry in &section.entries {
            let price = if entry.priced.is_discounted() {
                format!(
                    "{} (was {}, save {} with {})",
                    entry.priced.price,
                    entry.priced.listed_price,
                    entry.priced.savings(),
                    entry.priced.promotion.map(|p| p.name.as_str()).unwrap_or("promotion")
                )
            } else {
                entry.priced.price.display()
            };
            ctx.output
                .table_row(&[entry.product.id.as_str(), &entry.product.name, &price], &[12, 24, 0]);

            if args.options {
                for group in storefront.snapshot().groups_for(entry.product) {
                    let picks: Vec<String> = group
                        .selectable_options()
                        .map(|o| {
                            if o.price.is_zero() {
                                o.id.to_string()
                            } else {
                                format!("{} (+{})", o.id, o.price)
                            }
                        })
                        .collect();
                    ctx.output.list_item(&format!(
                        "@{}= {}  [{}..{}]{}",
                        group.id,
                        picks.join(", "),
                        group.min_selection,
                        group
                            .max_selection
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "*".to_string()),
                        if group.is_required() { " required" } else { "" }
                    ));
                }
            }
        }
    }

    connection.close().await?;
    Ok(())
}
