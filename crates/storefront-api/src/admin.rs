//! Back-office endpoints. The backend rejects non-admin callers; the
//! client does not pre-check the role.

use crate::catalog::Page;
use crate::models::{AdminReview, Order, OrderStatus, ProductStatus, ReviewDecision, ReviewStatus};
use crate::Items;
use auth_session::{ApiResult, HttpClient, RequestConfig};
use serde_json::{json, Value};
use tracing::info;

pub const ADMIN_ORDERS_PATH: &str = "/api/admin/orders";
pub const ADMIN_ORDER_STATUS_PATH: &str = "/api/admin/orders/status";
pub const ADMIN_USER_ACTIVE_PATH: &str = "/api/admin/users/active";
pub const ADMIN_REVIEWS_PATH: &str = "/api/admin/reviews";
pub const ADMIN_REVIEW_STATUS_PATH: &str = "/api/admin/reviews/status";
pub const ADMIN_PRODUCT_STATUS_PATH: &str = "/api/admin/products/status";

/// Moderation queue filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub status: Option<ReviewStatus>,
    pub product_id: Option<String>,
    pub user_id: Option<String>,
    pub page: Page,
}

impl ReviewFilter {
    fn to_config(&self) -> RequestConfig {
        let config = RequestConfig::new()
            .query_opt("status", self.status)
            .query_opt("productId", self.product_id.as_deref())
            .query_opt("userId", self.user_id.as_deref());
        self.page.apply(config)
    }
}

#[derive(Clone)]
pub struct AdminApi {
    client: HttpClient,
}

impl AdminApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Every order in the shop.
    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let orders: Items<Order> = self.client.get(ADMIN_ORDERS_PATH, None).await?;
        Ok(orders.items)
    }

    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ApiResult<Value> {
        let result = self
            .client
            .post(
                ADMIN_ORDER_STATUS_PATH,
                json!({ "orderId": order_id, "status": status }),
            )
            .await?;
        info!(order_id, %status, "Order status updated");
        Ok(result)
    }

    pub async fn set_user_active(&self, user_id: &str, is_active: bool) -> ApiResult<Value> {
        let result = self
            .client
            .post(
                ADMIN_USER_ACTIVE_PATH,
                json!({ "targetUserId": user_id, "isActive": is_active }),
            )
            .await?;
        info!(user_id, is_active, "User activation changed");
        Ok(result)
    }

    pub async fn list_reviews(&self, filter: &ReviewFilter) -> ApiResult<Vec<AdminReview>> {
        let reviews: Items<AdminReview> = self
            .client
            .get(ADMIN_REVIEWS_PATH, Some(filter.to_config()))
            .await?;
        Ok(reviews.items)
    }

    pub async fn set_review_status(&self, review_id: &str, decision: ReviewDecision) -> ApiResult<Value> {
        let status = ReviewStatus::from(decision);
        let result = self
            .client
            .post(
                ADMIN_REVIEW_STATUS_PATH,
                json!({ "reviewId": review_id, "status": status }),
            )
            .await?;
        info!(review_id, %status, "Review moderated");
        Ok(result)
    }

    pub async fn set_product_status(&self, product_id: &str, status: ProductStatus) -> ApiResult<Value> {
        let result = self
            .client
            .post(
                ADMIN_PRODUCT_STATUS_PATH,
                json!({ "productId": product_id, "status": status }),
            )
            .await?;
        info!(product_id, %status, "Product status updated");
        Ok(result)
    }
}
