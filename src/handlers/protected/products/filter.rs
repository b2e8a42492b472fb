// GET /products/filter?search=... - unpaginated name-substring filter

use axum::{extract::Query, response::Json};
use serde::Deserialize;

use crate::database::models::ProductWithProps;
use crate::error::ApiError;
use crate::services::product_service::ProductService;

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    pub search: Option<String>,
}

pub async fn filter_by_name(
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<ProductWithProps>>, ApiError> {
    // A missing or empty search term matches every product
    let search = query.search.unwrap_or_default();

    let service = ProductService::new().await?;
    let products = service.filter_by_name(&search).await?;

    Ok(Json(products))
}
