// POST /login - authenticate against email or phone, return a bearer token

use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Single identifier matched against either the email or phone column
    pub email_or_phone: String,
    pub password: String,
}

pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::main_pool().await?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1 OR phone = $1")
        .bind(&payload.email_or_phone)
        .fetch_optional(&pool)
        .await
        .map_err(DatabaseError::from)?;

    // Unknown identifier and wrong password get the same answer
    let user = user.ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    let verified = verify_password(&payload.password, &user.password).map_err(|e| {
        tracing::error!("Unreadable password hash for user {}: {}", user.id, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    if !verified {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let token = generate_jwt(Claims::new(user.id, user.name.clone(), user.email.clone()))?;

    Ok(Json(json!({
        "status": "success",
        "user": user,
        "authorization": {
            "token": token,
            "type": "bearer",
        }
    })))
}
