//! Typed storefront endpoints on top of the authenticated [`HttpClient`].
//!
//! Every call goes through the client core, so tokens are attached and a
//! 401 is recovered with one refresh-then-retry without the caller noticing.

pub mod admin;
pub mod cart;
pub mod catalog;
mod models;
pub mod orders;
pub mod retry;

pub use admin::{AdminApi, ReviewFilter};
pub use cart::CartApi;
pub use catalog::{CatalogApi, NewReview, Page, ProductQuery};
pub use models::{
    amount, AdminReview, Cart, CartItem, Order, OrderStatus, Product, ProductImage,
    ProductStatus, Review, ReviewDecision, ReviewStatus, Shipping, UnknownStatus,
};
pub use orders::OrdersApi;
pub use retry::{with_retries, RetryConfig};

use auth_session::{ApiError, ApiResult, HttpClient};
use serde::Deserialize;

/// `{items: [...]}` listing envelope; a missing list is empty.
#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Reject identifiers that would change the request path.
pub(crate) fn path_segment<'a>(what: &str, value: &'a str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) {
        return Err(ApiError::Config(format!("invalid {}: {:?}", what, value)));
    }
    Ok(trimmed)
}

/// All storefront clients sharing one [`HttpClient`].
#[derive(Clone)]
pub struct StorefrontApi {
    pub catalog: CatalogApi,
    pub cart: CartApi,
    pub orders: OrdersApi,
    pub admin: AdminApi,
}

impl StorefrontApi {
    pub fn new(client: &HttpClient) -> Self {
        Self {
            catalog: CatalogApi::new(client.clone()),
            cart: CartApi::new(client.clone()),
            orders: OrdersApi::new(client.clone()),
            admin: AdminApi::new(client.clone()),
        }
    }
}
