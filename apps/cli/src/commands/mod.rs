//! CLI command implementations.

mod admin;
mod auth;
mod cart;
mod orders;
mod products;

pub use admin::{
    admin_order_status, admin_orders, admin_product_status, admin_review_status, admin_reviews,
    admin_user_active,
};
pub use auth::{login, logout, register, status, whoami};
pub use cart::{cart_set, cart_show};
pub use orders::{orders_checkout, orders_create, orders_delete, orders_list};
pub use products::{products_list, products_review, products_reviews, products_show};

use crate::output::{self, OutputFormat};
use anyhow::Result;
use auth_session::{BootstrapOutcome, Session};
use storefront_api::{Order, StorefrontApi};

/// Everything a command needs, built once after bootstrap.
pub struct Context {
    session: Session,
    api: StorefrontApi,
    bootstrap: BootstrapOutcome,
    pub format: OutputFormat,
}

impl Context {
    pub fn new(session: Session, bootstrap: BootstrapOutcome, format: OutputFormat) -> Self {
        let api = StorefrontApi::new(session.client());
        Self {
            session,
            api,
            bootstrap,
            format,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &StorefrontApi {
        &self.api
    }

    pub fn bootstrap(&self) -> BootstrapOutcome {
        self.bootstrap
    }

    /// Fail early for commands that only make sense with a session.
    fn require_login(&self) -> Result<()> {
        if !self.session.snapshot().is_authenticated {
            anyhow::bail!("Not logged in. Run 'storefront login' first");
        }
        Ok(())
    }
}

/// Shared order table, used by both the user and admin listings.
fn print_orders(orders: &[Order], ctx: &Context) -> Result<()> {
    if let OutputFormat::Json = ctx.format {
        return output::print_json(&orders);
    }

    if orders.is_empty() {
        println!("No orders.");
        return Ok(());
    }

    println!(
        "{:<38} {:<12} {:>14}  {}",
        "ORDER", "STATUS", "TOTAL", "PLACED"
    );
    for order in orders {
        let total = order
            .total
            .map(|t| output::format_price(t, order.currency.as_deref()))
            .unwrap_or_else(|| "-".to_string());
        let placed = order
            .placed_at
            .as_deref()
            .map(output::format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<12} {:>14}  {}",
            order.order_id,
            order.status.to_string(),
            total,
            placed
        );
    }
    Ok(())
}
