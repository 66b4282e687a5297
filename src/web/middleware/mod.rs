//! Middleware for the web API.

pub mod auth;
pub mod cors;
pub mod hosts;
pub mod security;

pub use auth::{jwt_auth, AuthUser, JwtClaims, JwtState};
pub use cors::create_cors_layer;
pub use hosts::{check_host, AllowedHosts};
pub use security::security_headers;
