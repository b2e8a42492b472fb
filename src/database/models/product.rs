use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in the smallest currency unit
    pub price: i64,
    /// Stock quantity
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Arbitrary key-value attribute attached to a product, e.g. "color" -> "red".
/// Duplicate names per product are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductProperty {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its eagerly loaded properties, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithProps {
    #[serde(flatten)]
    pub product: Product,
    pub product_props: Vec<ProductProperty>,
}
