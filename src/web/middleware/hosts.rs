//! Host header validation.

use axum::{
    body::Body,
    http::{header::HOST, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::web::error::ApiError;

/// Hosts the server answers for.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    hosts: Vec<String>,
    any: bool,
}

impl AllowedHosts {
    /// Build from `server.allowed_hosts`. Debug mode accepts any host.
    pub fn new(hosts: &[String], debug: bool) -> Self {
        let hosts: Vec<String> = hosts.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let any = debug || hosts.iter().any(|h| h == "*");
        Self { hosts, any }
    }

    /// Whether a `Host` header value is acceptable. The port is ignored.
    pub fn is_allowed(&self, host: &str) -> bool {
        if self.any {
            return true;
        }
        let name = strip_port(host).to_ascii_lowercase();
        self.hosts.iter().any(|h| *h == name)
    }
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.rsplit_once(':').map_or(host, |(name, _)| name)
}

/// Reject requests for hosts that are not configured.
pub async fn check_host(
    allowed: Arc<AllowedHosts>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host());

    let accepted = match host {
        Some(host) => allowed.is_allowed(host),
        None => allowed.any,
    };

    if accepted {
        next.run(request).await
    } else {
        tracing::warn!(host = ?host, "Rejected request with invalid host header");
        ApiError::bad_request("Invalid host header").into_response()
    }
}
