pub mod auth;

pub use auth::{bearer_auth_middleware, bearer_token_middleware, AuthUser, BearerToken};
