//! HTTP interface of the webmail service.
//!
//! Accounts (`/accounts/`), the inbox and compose pages as JSON
//! (`/inbox/`, `/compose/`) and the mailbox API (`/api/`). Authenticated
//! routes take a JWT bearer token issued by login or registration.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
