use sqlx::PgPool;
use std::collections::HashMap;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Product, ProductProperty, ProductWithProps};

/// Fixed page size for product listings, not caller-configurable
pub const PER_PAGE: i64 = 40;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    Manager(#[from] DatabaseError),
}

/// Paginated product listing as served by GET /products
#[derive(Debug, serde::Serialize)]
pub struct ProductPage {
    pub data: Vec<ProductWithProps>,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
    pub total: i64,
}

pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub async fn new() -> Result<Self, ProductError> {
        let pool = DatabaseManager::main_pool().await?;
        Ok(Self { pool })
    }

    /// One page of products in primary-key order, properties eagerly attached.
    ///
    /// A page past the end returns empty data but valid page/pages/total
    /// metadata. Pages below 1 are clamped to 1.
    pub async fn get_all_products(&self, page: i64) -> Result<ProductPage, ProductError> {
        let page = page.max(1);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let products: Vec<Product> =
            sqlx::query_as("SELECT * FROM products ORDER BY id LIMIT $1 OFFSET $2")
                .bind(PER_PAGE)
                .bind(page_offset(page))
                .fetch_all(&self.pool)
                .await?;

        let data = self.attach_props(products).await?;

        Ok(ProductPage {
            data,
            page,
            pages: page_count(total),
            limit: PER_PAGE,
            total,
        })
    }

    /// All products whose name contains `search` as a case-insensitive
    /// substring, properties eagerly attached. Empty input matches everything.
    /// Unpaginated and uncapped.
    pub async fn filter_by_name(&self, search: &str) -> Result<Vec<ProductWithProps>, ProductError> {
        let pattern = format!("%{}%", escape_like(search));

        let products: Vec<Product> =
            sqlx::query_as("SELECT * FROM products WHERE name ILIKE $1 ORDER BY id")
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?;

        self.attach_props(products).await
    }

    /// Eager load: one batched query for all properties of the given
    /// products, grouped in memory by product_id. Avoids N+1 fetches.
    async fn attach_props(&self, products: Vec<Product>) -> Result<Vec<ProductWithProps>, ProductError> {
        if products.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        let props: Vec<ProductProperty> =
            sqlx::query_as("SELECT * FROM product_props WHERE product_id = ANY($1) ORDER BY id")
                .bind(&ids)
                .fetch_all(&self.pool)
                .await?;

        let mut by_product: HashMap<i64, Vec<ProductProperty>> = HashMap::new();
        for prop in props {
            by_product.entry(prop.product_id).or_default().push(prop);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let product_props = by_product.remove(&product.id).unwrap_or_default();
                ProductWithProps { product, product_props }
            })
            .collect())
    }
}

/// Row offset for a page (page >= 1). Saturates instead of overflowing so
/// an absurdly large page number behaves like any other beyond-last page.
fn page_offset(page: i64) -> i64 {
    (page - 1).saturating_mul(PER_PAGE)
}

/// Total page count: ceil(total / PER_PAGE), reported as 1 for an empty table
fn page_count(total: i64) -> i64 {
    ((total + PER_PAGE - 1) / PER_PAGE).max(1)
}

/// Escape LIKE/ILIKE metacharacters so user input matches literally.
/// Without this, `%` or `_` in a search string would act as wildcards.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '\\' || c == '%' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
