//! Catalog commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use storefront_api::{with_retries, NewReview, Page, ProductQuery};

/// List products matching the filters.
pub async fn products_list(ctx: &Context, query: ProductQuery, retries: u32) -> Result<()> {
    let catalog = &ctx.api().catalog;
    let products = with_retries(retries, || catalog.list_products(&query)).await?;

    if let OutputFormat::Json = ctx.format {
        return output::print_json(&products);
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    println!("{:<28} {:<32} {:>14}", "SLUG", "NAME", "PRICE");
    for product in &products {
        println!(
            "{:<28} {:<32} {:>14}",
            product.slug,
            product.name,
            output::format_price(product.price, product.currency.as_deref())
        );
    }
    Ok(())
}

/// Show one product.
pub async fn products_show(ctx: &Context, slug: &str) -> Result<()> {
    let product = ctx.api().catalog.product_detail(slug).await?;

    if let OutputFormat::Json = ctx.format {
        return output::print_json(&product);
    }

    output::print_heading(&product.name);
    output::print_row("ID", &product.product_id);
    output::print_row("Slug", &product.slug);
    output::print_row(
        "Price",
        &output::format_price(product.price, product.currency.as_deref()),
    );
    output::print_row("Brand", output::or_dash(product.brand.as_deref()));
    output::print_row("Model", output::or_dash(product.model.as_deref()));
    output::print_row("Type", output::or_dash(product.bike_type.as_deref()));
    output::print_row("Category", output::or_dash(product.category_slug.as_deref()));
    if let Some(status) = product.status {
        output::print_row("Status", status.as_str());
    }
    output::print_row("Image", output::or_dash(product.main_image()));
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{}", description);
    }
    Ok(())
}

/// List reviews of a product.
pub async fn products_reviews(ctx: &Context, slug: &str, page: Page) -> Result<()> {
    let reviews = ctx.api().catalog.product_reviews(slug, page).await?;

    if let OutputFormat::Json = ctx.format {
        return output::print_json(&reviews);
    }

    if reviews.is_empty() {
        println!("No reviews yet.");
        return Ok(());
    }

    for review in &reviews {
        println!(
            "{} {}  {}",
            "*".repeat(usize::from(review.rating.min(5))),
            output::format_timestamp(&review.created_at),
            output::or_dash(review.comment.as_deref())
        );
    }
    Ok(())
}

/// Post a review as the signed-in user.
pub async fn products_review(
    ctx: &Context,
    slug: &str,
    rating: u8,
    comment: Option<String>,
) -> Result<()> {
    ctx.require_login()?;
    let review = ctx
        .api()
        .catalog
        .create_review(slug, &NewReview { rating, comment })
        .await?;

    match ctx.format {
        OutputFormat::Text => {
            let status = review.status.map(|s| s.as_str()).unwrap_or("submitted");
            println!("Review {} {}", review.review_id, status);
        }
        OutputFormat::Json => output::print_json(&review)?,
    }
    Ok(())
}
