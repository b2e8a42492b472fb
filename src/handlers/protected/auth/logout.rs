// POST /logout - revoke the current bearer token

use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::token_fingerprint;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::BearerToken;

pub async fn logout(Extension(token): Extension<BearerToken>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::main_pool().await?;

    // ON CONFLICT keeps this idempotent: revoking an already-revoked token succeeds
    sqlx::query("INSERT INTO revoked_tokens (token_hash) VALUES ($1) ON CONFLICT (token_hash) DO NOTHING")
        .bind(token_fingerprint(&token.0))
        .execute(&pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Successfully logged out",
    })))
}
