use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use serde_json::Value;

use crate::auth::{token_fingerprint, validate_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

/// Authenticated principal extracted from the bearer token and threaded
/// through the request pipeline via extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}

/// Raw bearer token of the current request, kept so logout can revoke it
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

/// Bearer-token middleware for protected routes: validates the JWT, rejects
/// revoked tokens, and injects the authenticated principal into the request
pub async fn bearer_auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    authenticate(headers, request, next, true).await
}

/// Variant for logout: requires a signature-valid token but tolerates an
/// already-revoked one, so logging out twice succeeds both times
pub async fn bearer_token_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<Value>)> {
    authenticate(headers, request, next, false).await
}

async fn authenticate(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
    check_revocation: bool,
) -> Result<Response, (StatusCode, Json<Value>)> {
    // Extract token from Authorization header
    let token = extract_bearer_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request: {}", msg);
        unauthorized()
    })?;

    // Validate and decode the JWT
    let claims = validate_jwt(&token).map_err(|msg| {
        tracing::debug!("Rejected bearer token: {}", msg);
        unauthorized()
    })?;

    // A logged-out token is no longer valid even before its expiry
    if check_revocation {
        match is_revoked(&token).await {
            Ok(false) => {}
            Ok(true) => return Err(unauthorized()),
            Err(err) => {
                let api_error = ApiError::from(err);
                return Err((
                    StatusCode::from_u16(api_error.status_code())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    Json(api_error.to_json()),
                ));
            }
        }
    }

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Uniform 401 body; does not reveal whether the token was missing,
/// malformed, expired or revoked
fn unauthorized() -> (StatusCode, Json<Value>) {
    let api_error = ApiError::unauthorized("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(api_error.to_json()))
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Check the revocation table for this token's fingerprint
async fn is_revoked(token: &str) -> Result<bool, crate::database::manager::DatabaseError> {
    let pool = DatabaseManager::main_pool().await?;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE token_hash = $1")
        .bind(token_fingerprint(token))
        .fetch_one(&pool)
        .await?;
    Ok(count > 0)
}
