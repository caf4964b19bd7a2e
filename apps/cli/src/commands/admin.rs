//! Back-office commands.

use super::{print_orders, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use storefront_api::{OrderStatus, ProductStatus, ReviewDecision, ReviewFilter};

/// Non-admins are rejected by the backend; this only saves the round trip
/// when the profile already says so.
fn require_admin(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let snapshot = ctx.session().snapshot();
    if let Some(user) = snapshot.user.or_else(|| ctx.session().display_user()) {
        if user.role.is_some() && !user.is_admin() {
            anyhow::bail!("Admin access required");
        }
    }
    Ok(())
}

pub async fn admin_orders(ctx: &Context) -> Result<()> {
    require_admin(ctx)?;
    let orders = ctx.api().admin.list_orders().await?;
    print_orders(&orders, ctx)
}

pub async fn admin_order_status(ctx: &Context, id: &str, status: OrderStatus) -> Result<()> {
    require_admin(ctx)?;
    ctx.api().admin.update_order_status(id, status).await?;
    output::print_success(&format!("Order {} is now {}", id, status), &ctx.format);
    Ok(())
}

pub async fn admin_user_active(ctx: &Context, user_id: &str, active: bool) -> Result<()> {
    require_admin(ctx)?;
    ctx.api().admin.set_user_active(user_id, active).await?;
    let state = if active { "activated" } else { "deactivated" };
    output::print_success(&format!("User {} {}", user_id, state), &ctx.format);
    Ok(())
}

pub async fn admin_reviews(ctx: &Context, filter: &ReviewFilter) -> Result<()> {
    require_admin(ctx)?;
    let reviews = ctx.api().admin.list_reviews(filter).await?;

    if let OutputFormat::Json = ctx.format {
        return output::print_json(&reviews);
    }

    if reviews.is_empty() {
        println!("No reviews.");
        return Ok(());
    }

    println!(
        "{:<38} {:<24} {:<28} {:>6} {:<9}",
        "REVIEW", "PRODUCT", "USER", "RATING", "STATUS"
    );
    for review in &reviews {
        println!(
            "{:<38} {:<24} {:<28} {:>6} {:<9}",
            review.review_id,
            review.product_slug,
            review.user_email,
            review.rating,
            review.status.as_str()
        );
    }
    Ok(())
}

pub async fn admin_review_status(ctx: &Context, id: &str, decision: ReviewDecision) -> Result<()> {
    require_admin(ctx)?;
    ctx.api().admin.set_review_status(id, decision).await?;
    let status: storefront_api::ReviewStatus = decision.into();
    output::print_success(&format!("Review {} {}", id, status), &ctx.format);
    Ok(())
}

pub async fn admin_product_status(ctx: &Context, id: &str, status: ProductStatus) -> Result<()> {
    require_admin(ctx)?;
    ctx.api().admin.set_product_status(id, status).await?;
    output::print_success(&format!("Product {} is now {}", id, status), &ctx.format);
    Ok(())
}
