//! Shopping cart of the signed-in user.

use crate::models::{Cart, CartItem};
use auth_session::{ApiResult, HttpClient};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const CART_PATH: &str = "/api/cart";
pub const CART_ITEMS_PATH: &str = "/api/cart/items";

/// The backend answers either `{cartId, items}` or a bare item list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CartPayload {
    List(Vec<CartItem>),
    Wrapped {
        #[serde(rename = "cartId", default)]
        cart_id: Option<String>,
        #[serde(default)]
        items: Vec<CartItem>,
    },
}

impl From<CartPayload> for Cart {
    fn from(payload: CartPayload) -> Self {
        match payload {
            CartPayload::List(items) => Cart {
                cart_id: None,
                items,
            },
            CartPayload::Wrapped { cart_id, items } => Cart { cart_id, items },
        }
    }
}

#[derive(Clone)]
pub struct CartApi {
    client: HttpClient,
}

impl CartApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Unrecognized payloads are treated as an empty cart.
    pub async fn get_cart(&self) -> ApiResult<Cart> {
        let body: Value = self.client.get(CART_PATH, None).await?;
        match serde_json::from_value::<CartPayload>(body) {
            Ok(payload) => Ok(payload.into()),
            Err(e) => {
                warn!(error = %e, "Unrecognized cart payload, treating as empty");
                Ok(Cart::default())
            }
        }
    }

    /// Set the quantity of a product. Zero removes it; negatives clamp to zero.
    pub async fn upsert_item(&self, product_id: &str, qty: i64) -> ApiResult<Value> {
        let qty = qty.max(0);
        debug!(product_id, qty, "Upserting cart item");
        self.client
            .post(CART_ITEMS_PATH, json!({ "productId": product_id, "qty": qty }))
            .await
    }
}
