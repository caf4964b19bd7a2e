//! Cart commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;

/// Show the cart contents.
pub async fn cart_show(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let cart = ctx.api().cart.get_cart().await?;

    if let OutputFormat::Json = ctx.format {
        return output::print_json(&serde_json::json!({
            "cart": cart,
            "subtotal": cart.subtotal(),
        }));
    }

    if cart.is_empty() {
        println!("Cart is empty.");
        return Ok(());
    }

    println!("{:<38} {:<28} {:>5} {:>12}", "PRODUCT", "NAME", "QTY", "PRICE");
    for item in &cart.items {
        let price = item
            .price
            .map(|p| output::format_price(p, None))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<28} {:>5} {:>12}",
            item.product_id,
            output::or_dash(item.name.as_deref()),
            item.quantity,
            price
        );
    }
    output::print_divider();
    println!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        output::format_price(cart.subtotal(), None)
    );
    Ok(())
}

/// Set the quantity of a product in the cart.
pub async fn cart_set(ctx: &Context, product_id: &str, qty: i64) -> Result<()> {
    ctx.require_login()?;
    let result = ctx.api().cart.upsert_item(product_id, qty).await?;

    match ctx.format {
        OutputFormat::Text => {
            if qty <= 0 {
                println!("Removed {} from cart", product_id);
            } else {
                println!("Cart updated: {} x{}", product_id, qty);
            }
        }
        OutputFormat::Json => output::print_json(&result)?,
    }
    Ok(())
}
