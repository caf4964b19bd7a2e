//! Order commands.

use super::{print_orders, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use serde_json::Value;
use storefront_api::Shipping;

/// List the signed-in user's orders.
pub async fn orders_list(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let orders = ctx.api().orders.list_orders().await?;
    print_orders(&orders, ctx)
}

/// Place an order with explicit shipping details.
pub async fn orders_create(ctx: &Context, shipping: Shipping) -> Result<()> {
    ctx.require_login()?;
    let created = ctx.api().orders.create_order(&shipping).await?;
    print_created(ctx, &created)
}

/// Place an order from the cart.
pub async fn orders_checkout(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let created = ctx.api().orders.create_order_from_cart().await?;
    print_created(ctx, &created)
}

/// Delete an order.
pub async fn orders_delete(ctx: &Context, id: &str) -> Result<()> {
    ctx.require_login()?;
    ctx.api().orders.delete_order(id).await?;
    output::print_success(&format!("Order {} deleted", id), &ctx.format);
    Ok(())
}

fn print_created(ctx: &Context, created: &Value) -> Result<()> {
    match ctx.format {
        OutputFormat::Text => {
            let id = created
                .get("order_id")
                .or_else(|| created.get("orderId"))
                .or_else(|| created.get("order").and_then(|o| o.get("order_id")))
                .and_then(|v| v.as_str());
            match id {
                Some(id) => println!("Order {} placed", id),
                None => println!("Order placed"),
            }
            Ok(())
        }
        OutputFormat::Json => output::print_json(created),
    }
}
