use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();
    tracing::info!("Starting Catalog API in {:?} mode", config.environment);

    // Bring the schema up to date; a dead database is reported by /health
    if let Err(e) = database::DatabaseManager::migrate().await {
        tracing::warn!("Migrations not applied at startup: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CATALOG_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Catalog API server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server");

    database::DatabaseManager::close_all().await;
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes
        .merge(auth_public_routes())
        // Protected API (bearer token required)
        .merge(auth_protected_routes())
        .merge(product_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
}

fn auth_protected_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::auth;

    Router::new()
        .route("/logout", post(auth::logout))
        // Logout only needs a signature-valid token so it stays idempotent
        .route_layer(axum::middleware::from_fn(middleware::bearer_token_middleware))
}

fn product_routes() -> Router {
    use handlers::protected::products;

    Router::new()
        .route("/products", get(products::index))
        .route("/products/filter", get(products::filter_by_name))
        .route_layer(axum::middleware::from_fn(middleware::bearer_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "status": "success",
        "data": {
            "name": "Catalog API",
            "version": version,
            "description": "Product catalog backend API with JWT bearer authentication",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/login, /register (public), /logout (protected)",
                "products": "/products?page=N, /products/filter?search=... (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "success",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "error",
                "message": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
