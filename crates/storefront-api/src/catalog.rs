//! Product catalog and reviews.

use crate::models::{Product, Review};
use crate::{path_segment, Items};
use auth_session::{ApiResult, HttpClient, RequestConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

pub const PRODUCTS_PATH: &str = "/api/products";

/// Filters for the product listing. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<String>,
}

impl ProductQuery {
    fn to_config(&self) -> RequestConfig {
        RequestConfig::new()
            .query_opt("search", self.search.as_deref())
            .query_opt("category", self.category.as_deref())
            .query_opt("minPrice", self.min_price)
            .query_opt("maxPrice", self.max_price)
            .query_opt("sort", self.sort.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    pub(crate) fn apply(&self, config: RequestConfig) -> RequestConfig {
        config
            .query_opt("limit", self.limit)
            .query_opt("offset", self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemEnvelope {
    item: Product,
}

#[derive(Debug, Deserialize)]
struct ReviewEnvelope {
    review: Review,
}

#[derive(Clone)]
pub struct CatalogApi {
    client: HttpClient,
}

impl CatalogApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        let page: Items<Product> = self.client.get(PRODUCTS_PATH, Some(query.to_config())).await?;
        debug!(count = page.items.len(), "Listed products");
        Ok(page.items)
    }

    pub async fn product_detail(&self, slug: &str) -> ApiResult<Product> {
        let path = format!("{}/{}", PRODUCTS_PATH, path_segment("product slug", slug)?);
        let envelope: ItemEnvelope = self.client.get(&path, None).await?;
        Ok(envelope.item)
    }

    pub async fn product_reviews(&self, slug: &str, page: Page) -> ApiResult<Vec<Review>> {
        let path = reviews_path(slug)?;
        let reviews: Items<Review> = self
            .client
            .get(&path, Some(page.apply(RequestConfig::new())))
            .await?;
        Ok(reviews.items)
    }

    /// Post a review for the signed-in user. Ratings outside 1..=5 are
    /// rejected by the backend, not here.
    pub async fn create_review(&self, slug: &str, review: &NewReview) -> ApiResult<Review> {
        let path = reviews_path(slug)?;
        let envelope: ReviewEnvelope = self.client.post(&path, json!(review)).await?;
        debug!(review_id = %envelope.review.review_id, "Review created");
        Ok(envelope.review)
    }
}

fn reviews_path(slug: &str) -> ApiResult<String> {
    Ok(format!(
        "{}/{}/reviews",
        PRODUCTS_PATH,
        path_segment("product slug", slug)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_session::testing::ScriptedTransport;
    use auth_session::{ApiError, AuthStore, Method};
    use std::sync::Arc;
    use token_store::{TokenPair, TokenStore};

    fn catalog() -> (CatalogApi, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let tokens = TokenStore::in_memory();
        tokens.persist(&TokenPair::new("at-1", "rt-1"));
        let client = HttpClient::new(transport.clone(), tokens, AuthStore::new());
        (CatalogApi::new(client), transport)
    }

    #[tokio::test]
    async fn test_list_products_sends_only_set_filters() {
        let (catalog, transport) = catalog();
        transport.respond(
            Method::Get,
            PRODUCTS_PATH,
            200,
            json!({"items": [
                {"product_id": "p1", "name": "Roadster", "slug": "roadster", "price": "1299.00"}
            ]}),
        );

        let query = ProductQuery {
            search: Some("road".to_string()),
            min_price: Some(100.0),
            sort: Some("price_asc".to_string()),
            ..Default::default()
        };
        let products = catalog.list_products(&query).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 1299.0);

        let sent = &transport.requests()[0];
        assert_eq!(
            sent.query,
            vec![
                ("search".to_string(), "road".to_string()),
                ("minPrice".to_string(), "100".to_string()),
                ("sort".to_string(), "price_asc".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_items_is_empty_listing() {
        let (catalog, transport) = catalog();
        transport.respond(Method::Get, PRODUCTS_PATH, 200, json!({}));

        let products = catalog.list_products(&ProductQuery::default()).await.unwrap();
        assert!(products.is_empty());
        assert!(transport.requests()[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_product_detail_unwraps_item() {
        let (catalog, transport) = catalog();
        transport.respond(
            Method::Get,
            "/api/products/roadster",
            200,
            json!({"item": {"product_id": "p1", "name": "Roadster", "slug": "roadster", "price": 10}}),
        );

        let product = catalog.product_detail("roadster").await.unwrap();
        assert_eq!(product.product_id, "p1");
    }

    #[tokio::test]
    async fn test_product_detail_404_is_status_error() {
        let (catalog, transport) = catalog();
        transport.respond(
            Method::Get,
            "/api/products/ghost",
            404,
            json!({"message": "Product not found"}),
        );

        let err = catalog.product_detail("ghost").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message(), Some("Product not found"));
    }

    #[tokio::test]
    async fn test_bad_slug_never_reaches_network() {
        let (catalog, transport) = catalog();

        assert!(matches!(
            catalog.product_detail("a/b").await,
            Err(ApiError::Config(_))
        ));
        assert!(matches!(
            catalog.product_reviews("", Page::default()).await,
            Err(ApiError::Config(_))
        ));
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_reviews_paging_and_create() {
        let (catalog, transport) = catalog();
        let path = "/api/products/roadster/reviews";
        transport.respond(
            Method::Get,
            path,
            200,
            json!({"items": [{
                "review_id": "r1", "product_id": "p1", "user_id": "u1",
                "rating": 5, "comment": "Fast", "created_at": "2026-01-02T00:00:00Z"
            }]}),
        );
        transport.respond(
            Method::Post,
            path,
            201,
            json!({"review": {
                "review_id": "r2", "product_id": "p1", "user_id": "u1",
                "rating": 4, "status": "pending", "created_at": "2026-01-03T00:00:00Z"
            }}),
        );

        let page = Page {
            limit: Some(10),
            offset: Some(20),
        };
        let reviews = catalog.product_reviews("roadster", page).await.unwrap();
        assert_eq!(reviews[0].status, None);
        assert_eq!(
            transport.requests()[0].query,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("offset".to_string(), "20".to_string()),
            ]
        );

        let created = catalog
            .create_review(
                "roadster",
                &NewReview {
                    rating: 4,
                    comment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.status, Some(crate::ReviewStatus::Pending));
        assert_eq!(transport.requests()[1].body, Some(json!({"rating": 4})));
    }
}
