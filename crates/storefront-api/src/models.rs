//! Payload types for the storefront endpoints.
//!
//! The backend is loose about shapes (prices arrive as numbers or numeric
//! strings, optional fields come and go), so most fields are optional and
//! amounts go through [`amount`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error for parsing a status name from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} status: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownStatus {}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownStatus {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

status_enum!(
    /// Order lifecycle status.
    OrderStatus, "order", {
        Pending => "pending",
        Paid => "paid",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Completed => "completed",
        Cancelled => "cancelled",
        Refunded => "refunded",
    }
);

status_enum!(
    /// Review moderation status.
    ReviewStatus, "review", {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

status_enum!(
    /// Catalog visibility of a product.
    ProductStatus, "product", {
        Draft => "draft",
        Active => "active",
        Hidden => "hidden",
        Archived => "archived",
    }
);

/// Decision an admin can make on a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ReviewStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ReviewStatus::Approved,
            ReviewDecision::Rejected => ReviewStatus::Rejected,
        }
    }
}

impl FromStr for ReviewDecision {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ReviewStatus>() {
            Ok(ReviewStatus::Approved) => Ok(ReviewDecision::Approved),
            Ok(ReviewStatus::Rejected) => Ok(ReviewDecision::Rejected),
            _ => Err(UnknownStatus {
                kind: "review decision",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub image_url: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    #[serde(with = "amount")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bike_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Main image, else the first image, else the flat `image_url`.
    pub fn main_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.is_main)
            .or_else(|| self.images.first())
            .map(|image| image.image_url.as_str())
            .or(self.image_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub product_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    /// Public listings may omit the status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

/// Review as listed in the moderation queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminReview {
    pub review_id: String,
    pub product_id: String,
    pub product_slug: String,
    pub product_name: String,
    pub user_id: String,
    pub user_email: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of `price * quantity` over items with a known price.
    pub fn subtotal(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|item| item.price.map(|price| price * f64::from(item.quantity)))
            .sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<f64>,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Delivery details for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Money amounts: JSON numbers or numeric strings (`"129.90"`).
pub mod amount {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    pub mod option {
        use super::AmountVisitor;
        use serde::de::{Deserializer, Visitor};
        use serde::Serializer;
        use std::fmt;

        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = Option<f64>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an optional number or numeric string")
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(AmountVisitor).map(Some)
            }
        }

        pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
            deserializer.deserialize_option(OptionVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(OrderStatus::Refunded.to_string(), "refunded");
        assert_eq!(OrderStatus::ALL.len(), 8);
        assert!("lost".parse::<OrderStatus>().is_err());

        assert_eq!("archived".parse::<ProductStatus>().unwrap(), ProductStatus::Archived);
        assert_eq!(
            "approved".parse::<ReviewDecision>().unwrap(),
            ReviewDecision::Approved
        );
        assert!("pending".parse::<ReviewDecision>().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(OrderStatus::Delivered).unwrap(), json!("delivered"));
        let status: ReviewStatus = serde_json::from_value(json!("rejected")).unwrap();
        assert_eq!(status, ReviewStatus::Rejected);
    }

    #[test]
    fn test_product_price_as_string_or_number() {
        let a: Product = serde_json::from_value(json!({
            "product_id": "p1", "name": "Roadster", "slug": "roadster", "price": "1299.50"
        }))
        .unwrap();
        let b: Product = serde_json::from_value(json!({
            "product_id": "p2", "name": "Trail", "slug": "trail", "price": 899
        }))
        .unwrap();
        assert_eq!(a.price, 1299.5);
        assert_eq!(b.price, 899.0);
        assert!(serde_json::from_value::<Product>(json!({
            "product_id": "p3", "name": "X", "slug": "x", "price": "free"
        }))
        .is_err());
    }

    #[test]
    fn test_product_main_image_preference() {
        let mut product: Product = serde_json::from_value(json!({
            "product_id": "p1", "name": "Roadster", "slug": "roadster", "price": 1,
            "image_url": "flat.jpg",
            "images": [
                {"image_url": "side.jpg", "is_main": false},
                {"image_url": "hero.jpg", "is_main": true}
            ]
        }))
        .unwrap();
        assert_eq!(product.main_image(), Some("hero.jpg"));

        product.images[1].is_main = false;
        assert_eq!(product.main_image(), Some("side.jpg"));

        product.images.clear();
        assert_eq!(product.main_image(), Some("flat.jpg"));
    }

    #[test]
    fn test_cart_item_optional_price() {
        let items: Vec<CartItem> = serde_json::from_value(json!([
            {"product_id": "p1", "price": "10.5", "quantity": 2},
            {"product_id": "p2", "price": null, "quantity": 1},
            {"product_id": "p3", "quantity": 4}
        ]))
        .unwrap();
        let cart = Cart {
            cart_id: None,
            items,
        };
        assert_eq!(cart.subtotal(), 21.0);
        assert_eq!(cart.item_count(), 7);
    }

    #[test]
    fn test_order_amounts() {
        let order: Order = serde_json::from_value(json!({
            "order_id": "o1", "status": "paid", "total": "45.00", "shipping_fee": 5
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.total, Some(45.0));
        assert_eq!(order.shipping_fee, Some(5.0));
        assert_eq!(order.discount, None);
    }

    #[test]
    fn test_shipping_skips_absent_fields() {
        let shipping = Shipping {
            full_name: "Ada Lovelace".to_string(),
            phone: "0900000000".to_string(),
            address_line: "1 Analytical St".to_string(),
            ward: None,
            district: None,
            province: Some("London".to_string()),
            note: None,
        };
        assert_eq!(
            serde_json::to_value(&shipping).unwrap(),
            json!({
                "full_name": "Ada Lovelace",
                "phone": "0900000000",
                "address_line": "1 Analytical St",
                "province": "London"
            })
        );
    }
}
