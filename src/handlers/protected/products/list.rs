// GET /products - paginated listing with eagerly loaded properties

use axum::{extract::Query, response::Json, Extension};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::product_service::{ProductPage, ProductService};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub async fn index(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    // Taken as a string so a malformed value falls back to the first page
    // instead of a framework-shaped 400 rejection
    let page = query
        .page
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(1);
    tracing::debug!(user_id = auth_user.user_id, page, "listing products");

    let service = ProductService::new().await?;
    let result = service.get_all_products(page).await?;

    Ok(Json(result))
}
