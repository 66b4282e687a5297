use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use webmail::mail::SmtpSender;
use webmail::web::WebServer;
use webmail::{Config, Database, WebmailError};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = if Path::new(CONFIG_PATH).exists() {
        match Config::load(CONFIG_PATH) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {CONFIG_PATH}: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Config::default()
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = webmail::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        webmail::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> webmail::Result<()> {
    info!(
        domain = %config.mail.domain,
        smtp = %format!("{}:{}", config.smtp.host, config.smtp.port),
        "Starting webmail"
    );

    let db = Database::open(&config.database.url, config.database.max_connections).await?;
    info!(url = %config.database.url, "Database ready");

    let sender = SmtpSender::new(&config.smtp, &config.mail.default_from)
        .map_err(|e| WebmailError::Config(e.to_string()))?;
    let server = WebServer::new(&config, db.clone(), Arc::new(sender))?;

    let result = server.run().await;
    db.close().await;
    result
}
