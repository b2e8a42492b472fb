// POST /register - create a user and issue an initial bearer token

use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{generate_jwt, hash_password, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::models::User;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
}

pub async fn register(Json(payload): Json<RegisterRequest>) -> Result<Json<Value>, ApiError> {
    if payload.password != payload.password_confirmation {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "password".to_string(),
            "The password confirmation does not match.".to_string(),
        );
        return Err(ApiError::validation_error("Validation failed", Some(field_errors)));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let pool = DatabaseManager::main_pool().await?;

    // Email and phone uniqueness is enforced by the database constraints
    let user: User = sqlx::query_as(
        "INSERT INTO users (name, email, phone, password) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&hashed)
    .fetch_one(&pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::conflict("Email or phone already registered")
        }
        _ => {
            tracing::error!("Failed to create user: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        }
    })?;

    // The user row is already committed at this point. If token issuance
    // fails the row stays put and the client gets a 500, matching the
    // documented registration contract.
    let token = generate_jwt(Claims::new(user.id, user.name.clone(), user.email.clone()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "User created successfully",
        "user": user,
        "authorization": {
            "token": token,
            "type": "bearer",
        }
    })))
}
