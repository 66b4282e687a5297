//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::RefreshTokenRepository;
use crate::mail::MailSender;
use crate::{Database, Result, WebmailError};

use super::handlers::AppState;
use super::middleware::{AllowedHosts, JwtState};
use super::router::create_router;

/// Token cleanup interval: 1 hour.
const CLEANUP_INTERVAL_SECS: u64 = 3600;

/// HTTP server for the webmail API.
pub struct WebServer {
    addr: SocketAddr,
    db: Database,
    router: Router,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Database, sender: Arc<dyn MailSender>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| WebmailError::Config(format!("invalid server address: {e}")))?;

        let app_state = Arc::new(AppState::new(db.clone(), sender, config));
        let jwt_state = Arc::new(JwtState::new(&config.security.secret_key));
        let allowed_hosts = Arc::new(AllowedHosts::new(
            &config.server.allowed_hosts,
            config.security.debug,
        ));

        let router = create_router(
            app_state,
            jwt_state,
            allowed_hosts,
            &config.server.cors_origins,
        );

        Ok(Self { addr, db, router })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the token cleanup background task.
    ///
    /// Runs every hour and removes expired and revoked refresh tokens.
    fn start_token_cleanup_task(db: Database) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match RefreshTokenRepository::new(db.pool()).cleanup_expired().await {
                    Ok(0) => tracing::debug!("No expired refresh tokens to clean up"),
                    Ok(count) => tracing::info!(
                        deleted_count = count,
                        "Cleaned up expired/revoked refresh tokens"
                    ),
                    Err(e) => tracing::warn!(error = %e, "Failed to cleanup refresh tokens"),
                }
            }
        });
    }

    async fn bind(self) -> Result<(TcpListener, Router)> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        // Start after a successful bind
        Self::start_token_cleanup_task(self.db);
        tracing::info!("Web server listening on http://{}", local_addr);

        Ok((listener, self.router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for tests binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
