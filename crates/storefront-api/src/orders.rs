//! Orders of the signed-in user.

use crate::models::{Order, Shipping};
use crate::{path_segment, Items};
use auth_session::{ApiResult, HttpClient};
use serde_json::{json, Value};
use tracing::info;

pub const ORDERS_PATH: &str = "/api/orders";

#[derive(Clone)]
pub struct OrdersApi {
    client: HttpClient,
}

impl OrdersApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let orders: Items<Order> = self.client.get(ORDERS_PATH, None).await?;
        Ok(orders.items)
    }

    /// Place an order with explicit shipping details.
    pub async fn create_order(&self, shipping: &Shipping) -> ApiResult<Value> {
        let created: Value = self
            .client
            .post(ORDERS_PATH, json!({ "shipping": shipping }))
            .await?;
        info!("Order created");
        Ok(created)
    }

    /// Place an order from the current cart contents.
    pub async fn create_order_from_cart(&self) -> ApiResult<Value> {
        let created: Value = self.client.post(ORDERS_PATH, json!({})).await?;
        info!("Order created from cart");
        Ok(created)
    }

    pub async fn delete_order(&self, order_id: &str) -> ApiResult<Value> {
        let path = format!("{}/{}", ORDERS_PATH, path_segment("order id", order_id)?);
        self.client.delete(&path).await
    }
}
